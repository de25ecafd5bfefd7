/// Assert that a world object mirrors `entity` with exactly `data` for `component`
#[macro_export]
macro_rules! assert_component {
    ($world:expr, $entity:expr, $component:expr, $data:expr) => {
        assert_eq!(
            $world.component($entity, $component),
            Some(&$data[..]),
            "Component {} of {:?} does not match",
            $component,
            $entity
        );
    };
}

/// Assert that the world holds no object for `entity`
#[macro_export]
macro_rules! assert_no_entity {
    ($world:expr, $entity:expr) => {
        assert!(
            $world.object_for($entity).is_none(),
            "World still holds an object for {:?}",
            $entity
        );
    };
}
