//! Visibility authorization
//!
//! [`can_view`] is the single read-access predicate. Listing filters with it
//! and single-idea fetches reject with it, so both paths always agree.

use crate::models::{Idea, Principal, Role, Visibility};

/// Decide whether a viewer may read an idea.
///
/// Admins see everything, including unapproved and private ideas. Everyone
/// else, the idea's own author included, is denied unapproved ideas; approved
/// ideas are then gated by their visibility mode.
pub fn can_view(idea: &Idea, username: Option<&str>, role: Option<Role>) -> bool {
    if role == Some(Role::Admin) {
        return true;
    }

    if !idea.approved {
        return false;
    }

    match &idea.visibility {
        Visibility::Public => true,
        Visibility::Private => username == Some(idea.author.as_str()),
        Visibility::RestrictedTo(users) => username.is_some_and(|u| users.contains(u)),
    }
}

/// [`can_view`] for an optional request principal
pub fn principal_can_view(idea: &Idea, viewer: Option<&Principal>) -> bool {
    can_view(
        idea,
        viewer.map(|p| p.username.as_str()),
        viewer.map(|p| p.role),
    )
}

/// Deleting an idea requires admin or authorship
pub fn can_delete(idea: &Idea, principal: &Principal) -> bool {
    principal.is_admin() || principal.username == idea.author
}

/// Page edits (add, delete, reorder) are reserved to the author
pub fn can_edit_pages(idea: &Idea, principal: &Principal) -> bool {
    principal.username == idea.author
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdeaType, Page};
    use chrono::Utc;

    fn idea(visibility: Visibility, approved: bool) -> Idea {
        Idea {
            id: "reels".to_string(),
            name: "Reels".to_string(),
            author: "alice".to_string(),
            description: String::new(),
            visibility,
            approved,
            created_at: Utc::now(),
            idea_type: IdeaType::Hackathon,
            pages: vec![Page {
                title: "Overview".to_string(),
                content: "<h1>Overview</h1>".to_string(),
                filename: "overview.html".to_string(),
            }],
        }
    }

    fn all_visibilities() -> Vec<Visibility> {
        vec![
            Visibility::Public,
            Visibility::Private,
            Visibility::restricted_to(["alice", "bob"]),
        ]
    }

    #[test]
    fn test_unapproved_visible_only_to_admin() {
        let viewers: [(Option<&str>, Option<Role>); 6] = [
            (None, None),
            (Some("alice"), Some(Role::Hacker)),
            (Some("bob"), Some(Role::Hacker)),
            (Some("carol"), Some(Role::Hacker)),
            (Some("alice"), None),
            (Some("admin"), Some(Role::Admin)),
        ];

        for visibility in all_visibilities() {
            let idea = idea(visibility, false);
            for (username, role) in viewers {
                assert_eq!(
                    can_view(&idea, username, role),
                    role == Some(Role::Admin),
                    "viewer {:?}/{:?} on {:?}",
                    username,
                    role,
                    idea.visibility
                );
            }
        }
    }

    #[test]
    fn test_unapproved_hidden_from_own_author() {
        let idea = idea(Visibility::Public, false);
        assert!(!can_view(&idea, Some("alice"), Some(Role::Hacker)));
    }

    #[test]
    fn test_restricted_list() {
        let idea = idea(Visibility::restricted_to(["alice", "bob"]), true);
        assert!(!can_view(&idea, Some("carol"), Some(Role::Hacker)));
        assert!(can_view(&idea, Some("alice"), Some(Role::Hacker)));
        assert!(can_view(&idea, Some("bob"), Some(Role::Hacker)));
        assert!(!can_view(&idea, None, None));
    }

    #[test]
    fn test_private_author_only() {
        let idea = idea(Visibility::Private, true);
        assert!(can_view(&idea, Some("alice"), Some(Role::Hacker)));
        assert!(!can_view(&idea, Some("bob"), Some(Role::Hacker)));
        assert!(!can_view(&idea, None, None));
        assert!(can_view(&idea, Some("admin"), Some(Role::Admin)));
    }

    #[test]
    fn test_public_approved_for_everyone() {
        let idea = idea(Visibility::Public, true);
        assert!(can_view(&idea, None, None));
        assert!(can_view(&idea, Some("carol"), Some(Role::Hacker)));
    }

    #[test]
    fn test_edit_rights() {
        let idea = idea(Visibility::Public, true);
        let alice = Principal::new("alice", Role::Hacker);
        let bob = Principal::new("bob", Role::Hacker);
        let admin = Principal::new("admin", Role::Admin);

        assert!(can_delete(&idea, &alice));
        assert!(can_delete(&idea, &admin));
        assert!(!can_delete(&idea, &bob));

        assert!(can_edit_pages(&idea, &alice));
        assert!(!can_edit_pages(&idea, &admin));
    }
}
