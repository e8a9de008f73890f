/// The site's fixed archive warnings. They appear among a work's tags but are
/// not freeform tags and are never tallied as such.
pub const ARCHIVE_WARNINGS: [&str; 6] = [
    "Creator Chose Not To Use Archive Warnings",
    "Graphic Depictions Of Violence",
    "Major Character Death",
    "No Archive Warnings Apply",
    "Rape/Non-Con",
    "Underage",
];

/// Navigation and action strings that show up where a commenter name is
/// expected. Matched case-insensitively.
pub const UI_LABELS: &[&str] = &[
    "Reply",
    "Delete",
    "Edit",
    "Spam",
    "Select",
    "Mark Read",
    "Mark Unread",
    "Delete From Inbox",
    "Select All",
    "Select None",
    "Dashboard",
    "Profile",
    "Preferences",
    "Skins",
    "Works",
    "Drafts",
    "Series",
    "Bookmarks",
    "Collections",
    "Inbox",
    "Statistics",
    "History",
    "Subscriptions",
    "Sign-ups",
    "Assignments",
    "Claims",
    "Previous",
    "Next",
    "Log In",
    "Log Out",
    "Sign Up",
    "Anonymous",
    "Guest",
];

/// Whether `tag` is one of [`ARCHIVE_WARNINGS`].
#[must_use]
pub fn is_archive_warning(tag: &str) -> bool {
    let tag = tag.trim();
    ARCHIVE_WARNINGS.iter().any(|w| w.eq_ignore_ascii_case(tag))
}

/// Whether a rating label marks mature or explicit content.
#[must_use]
pub fn is_mature_rating(rating: &str) -> bool {
    let lower = rating.to_ascii_lowercase();
    lower.contains("mature") || lower.contains("explicit")
}

/// Strategy deciding whether a scraped name is a real commenter.
pub trait AuthorFilter: Send + Sync {
    /// True when `name` should be counted as a commenter for `identity`.
    fn is_author(&self, name: &str, identity: &str) -> bool;
}

/// Rejects blank names, the scanning user, one-character names and known UI labels.
#[derive(Debug, Clone)]
pub struct UiLabelFilter {
    blocked: Vec<String>,
    min_len: usize,
}

impl Default for UiLabelFilter {
    fn default() -> Self {
        Self {
            blocked: UI_LABELS.iter().map(|l| l.to_lowercase()).collect(),
            min_len: 2,
        }
    }
}

impl UiLabelFilter {
    /// Filter with the built-in label list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add extra labels to block.
    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked
            .extend(labels.into_iter().map(|l| l.as_ref().trim().to_lowercase()));
        self
    }
}

impl AuthorFilter for UiLabelFilter {
    fn is_author(&self, name: &str, identity: &str) -> bool {
        let name = name.trim();
        if name.chars().count() < self.min_len || name == identity.trim() {
            return false;
        }
        let lower = name.to_lowercase();
        !self.blocked.iter().any(|b| *b == lower)
    }
}
