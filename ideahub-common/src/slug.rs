//! Identity derivation for ideas and pages
//!
//! Idea ids double as folder names and page filenames as file names, so both
//! are restricted to `[a-z0-9-]` (plus the `.html` suffix for pages).

/// Derive a slug: lowercase, collapse every run of characters outside
/// `[a-z0-9]` to one `-`, strip leading and trailing `-`.
///
/// ```
/// use ideahub_common::slug::slugify;
/// assert_eq!(slugify("  Educational Reels: Generator!  "), "educational-reels-generator");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Derive a page filename from its title.
///
/// Titles with no usable characters fall back to `page.html`.
pub fn page_filename(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "page.html".to_string()
    } else {
        format!("{}.html", slug)
    }
}

/// Derive an idea id from an archive's root folder name.
///
/// Unlike [`slugify`], each character outside `[a-z0-9-]` is replaced one for
/// one and nothing is trimmed, so `My-Cool-Idea` maps to `my-cool-idea`.
pub fn folder_id(root_folder: &str) -> String {
    root_folder
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Whether `segment` can be joined onto a directory without escaping it.
pub fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.contains("..")
        && !segment.contains(['/', '\\', '\0'])
}
