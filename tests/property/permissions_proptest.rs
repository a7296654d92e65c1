//! Property-based tests for the role hierarchy

use proptest::prelude::*;

use taskflow::shared::permissions::{Permission, Role};

fn role() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Owner),
        Just(Role::Admin),
        Just(Role::Editor),
        Just(Role::Commenter),
        Just(Role::Viewer),
    ]
}

fn rank(role: Role) -> u8 {
    match role {
        Role::Owner => 4,
        Role::Admin => 3,
        Role::Editor => 2,
        Role::Commenter => 1,
        Role::Viewer => 0,
    }
}

proptest! {
    #[test]
    fn test_higher_roles_never_lose_permissions(a in role(), b in role()) {
        let (high, low) = if rank(a) >= rank(b) { (a, b) } else { (b, a) };
        for permission in Permission::ALL {
            if low.can(permission) {
                prop_assert!(high.can(permission), "{} can {} but {} cannot", low, permission, high);
            }
        }
    }

    #[test]
    fn test_every_role_can_view(r in role()) {
        prop_assert!(r.can(Permission::View));
    }

    #[test]
    fn test_role_round_trips_through_text(r in role()) {
        prop_assert_eq!(r.to_string().parse::<Role>().unwrap(), r);
    }
}
