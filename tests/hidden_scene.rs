mod common;

use bevy::prelude::*;
use shadow_shot::prelude::*;

#[test]
fn render_components_are_stripped_recursively_once() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(HiddenScenePlugin);

    let mut grandchild = Entity::PLACEHOLDER;
    let mut child = Entity::PLACEHOLDER;
    app.world_mut()
        .spawn((SpatialBundle::default(), HiddenSceneRoot))
        .with_children(|p| {
            child = p
                .spawn((SpatialBundle::default(), Handle::<Mesh>::default(), Handle::<StandardMaterial>::default()))
                .with_children(|p| {
                    grandchild = p.spawn((SpatialBundle::default(), Handle::<Mesh>::default())).id();
                })
                .id();
        });
    let visible = app
        .world_mut()
        .spawn((SpatialBundle::default(), Handle::<Mesh>::default()))
        .id();

    app.update();

    let world = app.world();
    assert!(world.get::<Handle<Mesh>>(child).is_none());
    assert!(world.get::<Handle<StandardMaterial>>(child).is_none());
    assert!(world.get::<Handle<Mesh>>(grandchild).is_none());
    assert_eq!(world.get::<Visibility>(grandchild), Some(&Visibility::Hidden));
    // outside the hidden root nothing changes
    assert!(world.get::<Handle<Mesh>>(visible).is_some());
    assert_eq!(world.resource::<HiddenSceneSanitized>().stripped, 2);

    // one-time: a mesh added later survives another PostStartup pass
    app.world_mut().entity_mut(child).insert(Handle::<Mesh>::default());
    app.world_mut().run_schedule(PostStartup);
    app.update();
    assert!(app.world().get::<Handle<Mesh>>(child).is_some());
}

#[test]
fn gameplay_hidden_copy_is_invisible() {
    let mut app = common::build_app(GameConfig::default());
    assert!(app.world().get_resource::<HiddenSceneSanitized>().is_some());
    let world = app.world_mut();
    let mut q = world.query_filtered::<&Visibility, With<ShadowBody>>();
    let vis: Vec<Visibility> = q.iter(world).copied().collect();
    assert!(!vis.is_empty());
    assert!(vis.iter().all(|v| *v == Visibility::Hidden));
}
