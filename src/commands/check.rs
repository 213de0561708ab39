//! Check every post for front-matter problems

use anyhow::Result;

use crate::Site;

/// Print all violations; returns how many were found
pub fn run(site: &Site) -> Result<usize> {
    let store = site.load()?;
    let violations = store.all_violations();

    for v in &violations {
        println!("error: {}", v);
    }
    for v in store.missing_assets() {
        println!("warning: {}", v);
    }

    println!(
        "Checked {} posts: {} problem(s)",
        store.len() + rejected(&violations, &store),
        violations.len()
    );

    Ok(violations.len())
}

/// Posts that failed to load and so are not counted in the store
fn rejected(violations: &[crate::Violation], store: &crate::ContentStore) -> usize {
    let mut slugs: Vec<&str> = violations
        .iter()
        .map(|v| v.slug.as_str())
        .filter(|slug| store.get_post(slug).is_err())
        .collect();
    slugs.sort_unstable();
    slugs.dedup();
    slugs.len()
}
