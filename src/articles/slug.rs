use rand::distributions::Alphanumeric;
use rand::Rng;

/// Lowercase the title, keep alphanumerics, collapse everything else into
/// single hyphens, and append a short random suffix so two articles with
/// the same title get distinct slugs.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    if slug.is_empty() {
        suffix
    } else {
        format!("{slug}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_lowercase_hyphenated() {
        let slug = slugify("How To Train Your Dragon");
        assert!(slug.starts_with("how-to-train-your-dragon-"));
    }

    #[test]
    fn punctuation_collapses_to_single_hyphens() {
        let slug = slugify("Hello,  world!!");
        assert!(slug.starts_with("hello-world-"), "got {slug}");
    }

    #[test]
    fn same_title_gives_distinct_slugs() {
        assert_ne!(slugify("Same Title"), slugify("Same Title"));
    }

    #[test]
    fn empty_title_still_produces_a_slug() {
        assert_eq!(slugify("???").len(), 6);
    }
}
