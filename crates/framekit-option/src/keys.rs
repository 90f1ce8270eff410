//! Option names, reserved keys and hook tags.
//!
//! Centralising name construction keeps the persisted layout in one place.

use framekit_core::types::Slug;

/// Group used when none is given.
pub const DEFAULT_GROUP: &str = "default";

/// Suffix appended to the slug for every option name.
const OPTIONS_SUFFIX: &str = "_options";

// ── Option names ───────────────────────────────────────────

/// Name of the default group's option: `{slug}_options`.
pub fn option_name(slug: &Slug) -> String {
    slug.suffixed(OPTIONS_SUFFIX)
}

/// Prefix of every named group's option: `{slug}_options/`.
pub fn group_option_prefix(slug: &Slug) -> String {
    format!("{}/", slug.suffixed(OPTIONS_SUFFIX))
}

/// Name of a named group's option: `{slug}_options/{group}`.
pub fn group_option_name(slug: &Slug, group: &str) -> String {
    format!("{}{group}", group_option_prefix(slug))
}

/// The group a caller means by `None`.
pub fn group_or_default(group: Option<&str>) -> &str {
    group.unwrap_or(DEFAULT_GROUP)
}

// ── Reserved keys ──────────────────────────────────────────

/// Set while the plugin is activated.
pub const APP_ACTIVATED: &str = "__app_activated";

/// Plugin version recorded on first activation.
pub const LAST_UPGRADE_VERSION: &str = "last_upgrade_version";

// ── Hook tags (relative to the plugin's filter prefix) ─────

/// Filters the default group's option name.
pub const GET_OPTION_NAME: &str = "get_option_name";
/// Filters a named group's option name.
pub const GET_GROUP_OPTION_NAME: &str = "get_group_option_name";
/// Filters the default group's network option name.
pub const GET_SITE_OPTION_NAME: &str = "get_site_option_name";
/// Filters a named group's network option name.
pub const GET_GROUP_SITE_OPTION_NAME: &str = "get_group_site_option_name";
/// Filters every value read.
pub const GET_OPTION: &str = "get_option";
/// Fired after a value is written.
pub const CHANGED_OPTION: &str = "changed_option";
/// Fired after a value is deleted.
pub const DELETED_OPTION: &str = "deleted_option";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_names() {
        let slug = Slug::new("shop");
        assert_eq!(option_name(&slug), "shop_options");
        assert_eq!(group_option_prefix(&slug), "shop_options/");
        assert_eq!(group_option_name(&slug, "mail"), "shop_options/mail");
        assert_eq!(group_or_default(None), "default");
        assert_eq!(group_or_default(Some("mail")), "mail");
    }
}
