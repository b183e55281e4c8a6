mod common;

use common::{django_project, relative_paths, write};
use std::collections::BTreeSet;
use tailwind_content::{BuildConfiguration, ContentResolver};

fn config(content: &[&str]) -> BuildConfiguration {
    BuildConfiguration {
        content: content.iter().map(|s| s.to_string()).collect(),
        ..BuildConfiguration::default()
    }
}

#[test]
fn test_default_patterns_select_templates_and_python() {
    let project = django_project();
    let resolved = ContentResolver::new(project.path())
        .resolve(&BuildConfiguration::default())
        .unwrap();

    let files = relative_paths(&resolved.files);
    let unique: BTreeSet<&str> = files.iter().map(String::as_str).collect();
    assert_eq!(files.len(), unique.len(), "files must be unique: {:?}", files);
    assert_eq!(
        unique,
        BTreeSet::from([
            "templates/base.html",
            "events/templates/events/event_list.html",
            "accounts/templates/accounts/login.html",
            "events/forms.py",
            "events/views.py",
            "accounts/models.py",
        ])
    );

    // First-match order: one file per literal-prefix pattern
    assert_eq!(files[0], "templates/base.html");
    assert_eq!(files[1], "events/templates/events/event_list.html");
}

#[test]
fn test_pattern_match_counts() {
    let project = django_project();
    let resolved = ContentResolver::new(project.path())
        .resolve(&BuildConfiguration::default())
        .unwrap();

    let counts: Vec<(&str, usize)> = resolved
        .patterns
        .iter()
        .map(|p| (p.pattern.as_str(), p.matched))
        .collect();
    assert_eq!(
        counts,
        vec![
            ("./templates/**/*.html", 1),
            ("./events/templates/**/*.html", 1),
            ("./**/templates/**/*.html", 3),
            ("./**/*.py", 3),
        ]
    );
    assert!(resolved.unmatched_patterns().is_empty());
    assert_eq!(resolved.skipped, 0);
}

#[test]
fn test_duplicate_patterns_are_a_union() {
    let project = django_project();
    let once = ContentResolver::new(project.path())
        .resolve(&config(&["./**/*.py"]))
        .unwrap();
    let twice = ContentResolver::new(project.path())
        .resolve(&config(&["./**/*.py", "./**/*.py"]))
        .unwrap();

    assert_eq!(relative_paths(&once.files), relative_paths(&twice.files));
    assert_eq!(twice.patterns[1].matched, 3);
}

#[test]
fn test_order_of_patterns_does_not_change_the_set() {
    let project = django_project();
    let mut reversed = BuildConfiguration::default();
    reversed.content.reverse();

    let forward: BTreeSet<String> = relative_paths(
        &ContentResolver::new(project.path())
            .resolve(&BuildConfiguration::default())
            .unwrap()
            .files,
    )
    .into_iter()
    .collect();
    let backward: BTreeSet<String> = relative_paths(
        &ContentResolver::new(project.path()).resolve(&reversed).unwrap().files,
    )
    .into_iter()
    .collect();

    assert_eq!(forward, backward);
}

#[test]
fn test_negated_patterns_exclude() {
    let project = django_project();
    write(project.path(), "events/migrations/0001_initial.py", "# migration\n");

    let resolved = ContentResolver::new(project.path())
        .resolve(&config(&["./**/*.py", "!./**/migrations/*.py", "!./accounts/**"]))
        .unwrap();

    assert_eq!(
        relative_paths(&resolved.files),
        vec!["events/forms.py", "events/views.py"]
    );
    assert!(resolved.patterns[1].negated);
    assert_eq!(resolved.patterns[1].matched, 0);
}

#[test]
fn test_single_star_exclusion_keeps_nested_files() {
    let project = django_project();
    write(project.path(), "templates/events/list.html", r#"<ul class="divide-y"></ul>"#);

    let included = ContentResolver::new(project.path())
        .resolve(&config(&["./templates/*.html"]))
        .unwrap();
    assert_eq!(relative_paths(&included.files), vec!["templates/base.html"]);

    // The same text as an exclusion removes exactly what it includes
    let resolved = ContentResolver::new(project.path())
        .resolve(&config(&["./templates/**/*.html", "!./templates/*.html"]))
        .unwrap();
    assert_eq!(relative_paths(&resolved.files), vec!["templates/events/list.html"]);

    let resolved = ContentResolver::new(project.path())
        .with_excludes(&["templates/*.html".to_string()])
        .resolve(&config(&["./templates/**/*.html"]))
        .unwrap();
    assert_eq!(relative_paths(&resolved.files), vec!["templates/events/list.html"]);
}

#[test]
fn test_extra_excludes() {
    let project = django_project();
    let resolved = ContentResolver::new(project.path())
        .with_excludes(&["accounts/**".to_string()])
        .resolve(&config(&["./**/templates/**/*.html"]))
        .unwrap();

    let files = relative_paths(&resolved.files);
    assert!(!files.iter().any(|f| f.starts_with("accounts/")));
    assert_eq!(files.len(), 2);
}

#[test]
fn test_ignored_directories() {
    let project = django_project();
    let resolved = ContentResolver::new(project.path())
        .resolve(&BuildConfiguration::default())
        .unwrap();
    let files = relative_paths(&resolved.files);
    assert!(!files.iter().any(|f| f.contains("node_modules")));
    assert!(!files.iter().any(|f| f.contains("__pycache__")));

    // Naming the directory in the pattern opts back in
    let resolved = ContentResolver::new(project.path())
        .resolve(&config(&["./node_modules/flowbite/**/*.html"]))
        .unwrap();
    assert_eq!(
        relative_paths(&resolved.files),
        vec!["node_modules/flowbite/templates/modal.html"]
    );

    // And so does clearing the ignore list
    let resolved = ContentResolver::new(project.path())
        .with_ignored_dirs(Vec::<String>::new())
        .resolve(&config(&["./**/templates/**/*.html"]))
        .unwrap();
    assert_eq!(resolved.files.len(), 4);
}

#[test]
fn test_unmatched_patterns_reported() {
    let project = django_project();
    let resolved = ContentResolver::new(project.path())
        .resolve(&config(&["./templates/**/*.html", "./frontend/**/*.jsx"]))
        .unwrap();

    assert_eq!(resolved.unmatched_patterns(), vec!["./frontend/**/*.jsx"]);
    assert_eq!(resolved.files.len(), 1);
}

#[test]
fn test_total_bytes() {
    let project = django_project();
    let resolved = ContentResolver::new(project.path())
        .resolve(&config(&["./templates/*.html"]))
        .unwrap();
    assert_eq!(resolved.total_bytes(), common::BASE_HTML.len() as u64);
}
