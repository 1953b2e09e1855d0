//! Integration tests for the directory-per-idea repository
//!
//! Tests cover:
//! - save/list round trip preserving page order and content
//! - save idempotence on disk
//! - tolerance of missing page files, broken idea folders and legacy
//!   metadata with null or unrecognised values
//! - page add/delete/reorder and the non-empty page invariant
//! - delete removing the whole idea folder

use chrono::{TimeZone, Utc};
use ideahub_common::repository::{FsIdeaRepository, IdeaMetadata, IdeaRepository};
use ideahub_common::{Error, Idea, IdeaType, Page, ValidationError, Visibility};
use std::path::Path;
use tempfile::TempDir;

fn page(title: &str, filename: &str) -> Page {
    Page {
        title: title.to_string(),
        content: format!("<h1>{}</h1>\n<p>Body of {}</p>", title, filename),
        filename: filename.to_string(),
    }
}

fn sample_idea(id: &str, pages: Vec<Page>) -> Idea {
    Idea {
        id: id.to_string(),
        name: "Smart Campus Navigator".to_string(),
        author: "hacker".to_string(),
        description: "AR campus directions".to_string(),
        visibility: Visibility::restricted_to(["alice", "bob"]),
        approved: false,
        created_at: Utc.with_ymd_and_hms(2025, 11, 11, 0, 0, 0).unwrap(),
        idea_type: IdeaType::Project,
        pages,
    }
}

fn three_pages() -> Vec<Page> {
    vec![
        page("Zeta", "zeta.html"),
        page("Alpha", "alpha.html"),
        page("Middle", "middle.html"),
    ]
}

/// Snapshot of every file under `dir` as (relative path, contents)
fn snapshot(dir: &Path) -> Vec<(String, String)> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let rel = path.strip_prefix(dir).unwrap().to_string_lossy().to_string();
                files.push((rel, std::fs::read_to_string(&path).unwrap()));
            }
        }
    }
    files.sort();
    files
}

#[tokio::test]
async fn test_round_trip_preserves_order_and_content() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());

    let idea = sample_idea("smart-campus-navigator", three_pages());
    repo.save(&idea).await.unwrap();

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], idea);
    assert_eq!(all[0].pages, idea.pages);
}

#[tokio::test]
async fn test_on_disk_layout() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", three_pages())).await.unwrap();

    let idea_dir = dir.path().join("campus");
    assert!(idea_dir.join("pages").join("alpha.html").exists());

    let raw = std::fs::read_to_string(idea_dir.join("metadata.json")).unwrap();
    let metadata: IdeaMetadata = serde_json::from_str(&raw).unwrap();
    let order: Vec<_> = metadata.pages.iter().map(|p| p.filename.as_str()).collect();
    assert_eq!(order, ["zeta.html", "alpha.html", "middle.html"]);

    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["visibility"], serde_json::json!(["alice", "bob"]));
    assert_eq!(json["approved"], false);
    assert_eq!(json["ideaType"], "Project idea");
    assert!(json["createdAt"].is_string());
    assert!(json.get("id").is_none());
}

#[tokio::test]
async fn test_save_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    let idea = sample_idea("campus", three_pages());

    repo.save(&idea).await.unwrap();
    let first = snapshot(dir.path());
    repo.save(&idea).await.unwrap();
    assert_eq!(snapshot(dir.path()), first);
}

#[tokio::test]
async fn test_missing_page_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", three_pages())).await.unwrap();

    std::fs::remove_file(dir.path().join("campus/pages/alpha.html")).unwrap();

    let idea = repo.require("campus").await.unwrap();
    let order: Vec<_> = idea.pages.iter().map(|p| p.filename.as_str()).collect();
    assert_eq!(order, ["zeta.html", "middle.html"]);
}

#[tokio::test]
async fn test_broken_idea_does_not_break_listing() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("good", three_pages())).await.unwrap();

    let broken = dir.path().join("broken");
    std::fs::create_dir_all(&broken).unwrap();
    std::fs::write(broken.join("metadata.json"), "{ not json").unwrap();
    std::fs::create_dir_all(dir.path().join("empty-folder")).unwrap();
    std::fs::write(dir.path().join("stray.txt"), "x").unwrap();

    let all = repo.list_all().await.unwrap();
    let ids: Vec<_> = all.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["good"]);

    assert!(matches!(repo.get("broken").await, Err(Error::Storage(_))));
    assert!(repo.get("empty-folder").await.unwrap().is_none());
}

#[tokio::test]
async fn test_legacy_metadata_defaults() {
    let dir = TempDir::new().unwrap();
    let idea_dir = dir.path().join("legacy");
    std::fs::create_dir_all(idea_dir.join("pages")).unwrap();
    std::fs::write(
        idea_dir.join("metadata.json"),
        r#"{"name": "Legacy", "author": "admin", "pages": [{"title": "Only", "filename": "only.html"}]}"#,
    )
    .unwrap();
    std::fs::write(idea_dir.join("pages/only.html"), "<h1>Only</h1>").unwrap();

    let repo = FsIdeaRepository::new(dir.path());
    let idea = repo.require("legacy").await.unwrap();
    assert_eq!(idea.description, "");
    assert_eq!(idea.visibility, Visibility::Public);
    assert!(idea.approved);
    assert_eq!(idea.idea_type, IdeaType::Hackathon);
    assert_eq!(idea.pages.len(), 1);
}

fn write_legacy(root: &Path, id: &str, metadata: &str) {
    let idea_dir = root.join(id);
    std::fs::create_dir_all(idea_dir.join("pages")).unwrap();
    std::fs::write(idea_dir.join("metadata.json"), metadata).unwrap();
    std::fs::write(idea_dir.join("pages/only.html"), "<h1>Only</h1>").unwrap();
}

#[tokio::test]
async fn test_legacy_metadata_with_null_and_odd_values_stays_listed() {
    let dir = TempDir::new().unwrap();
    let pages = r#""pages": [{"title": "Only", "filename": "only.html"}]"#;
    write_legacy(
        dir.path(),
        "nulls",
        &format!(
            r#"{{"name": "Nulls", "author": "admin", "description": null, "visibility": null, "createdAt": null, "ideaType": null, {}}}"#,
            pages
        ),
    );
    write_legacy(
        dir.path(),
        "odd-date",
        &format!(
            r#"{{"name": "Odd date", "author": "admin", "createdAt": "11/11/2025", {}}}"#,
            pages
        ),
    );
    write_legacy(
        dir.path(),
        "odd-mode",
        &format!(
            r#"{{"name": "Odd mode", "author": "admin", "visibility": "friends", "ideaType": "Side quest", {}}}"#,
            pages
        ),
    );
    write_legacy(
        dir.path(),
        "js-date",
        &format!(
            r#"{{"name": "JS date", "author": "admin", "createdAt": "2025-11-11T08:30:00.000Z", {}}}"#,
            pages
        ),
    );

    let repo = FsIdeaRepository::new(dir.path());
    let before = Utc::now();
    let all = repo.list_all().await.unwrap();
    let ids: Vec<_> = all.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["js-date", "nulls", "odd-date", "odd-mode"]);

    let nulls = repo.require("nulls").await.unwrap();
    assert_eq!(nulls.description, "");
    assert_eq!(nulls.visibility, Visibility::Public);
    assert_eq!(nulls.idea_type, IdeaType::Hackathon);
    assert!(nulls.created_at >= before);

    let odd_date = repo.require("odd-date").await.unwrap();
    assert!(odd_date.created_at >= before);

    let odd_mode = repo.require("odd-mode").await.unwrap();
    assert_eq!(odd_mode.visibility, Visibility::Private);
    assert_eq!(odd_mode.idea_type, IdeaType::Hackathon);

    let js_date = repo.require("js-date").await.unwrap();
    assert_eq!(
        js_date.created_at,
        Utc.with_ymd_and_hms(2025, 11, 11, 8, 30, 0).unwrap()
    );
}

#[tokio::test]
async fn test_null_approval_loads_unapproved() {
    let dir = TempDir::new().unwrap();
    write_legacy(
        dir.path(),
        "pending",
        r#"{"name": "Pending", "author": "hacker", "approved": null, "pages": [{"title": "Only", "filename": "only.html"}]}"#,
    );

    let repo = FsIdeaRepository::new(dir.path());
    assert!(!repo.require("pending").await.unwrap().approved);
}

#[tokio::test]
async fn test_save_refuses_idea_without_pages() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", three_pages())).await.unwrap();

    for filename in ["zeta.html", "alpha.html", "middle.html"] {
        std::fs::remove_file(dir.path().join("campus/pages").join(filename)).unwrap();
    }
    let mut degraded = repo.require("campus").await.unwrap();
    assert!(degraded.pages.is_empty());
    degraded.approved = true;

    assert!(matches!(
        repo.save(&degraded).await,
        Err(Error::Validation(ValidationError::InvalidMetadata(_)))
    ));

    let raw = std::fs::read_to_string(dir.path().join("campus/metadata.json")).unwrap();
    let metadata: IdeaMetadata = serde_json::from_str(&raw).unwrap();
    assert_eq!(metadata.pages.len(), 3);
    assert!(!metadata.approved);
}

#[tokio::test]
async fn test_get_unknown_and_unsafe_ids() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path().join("ideas"));

    assert!(repo.get("nope").await.unwrap().is_none());
    assert!(repo.get("../ideas").await.unwrap().is_none());
    assert!(matches!(repo.require("nope").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_delete_removes_folder() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", three_pages())).await.unwrap();

    repo.delete("campus").await.unwrap();
    assert!(!dir.path().join("campus").exists());
    assert!(repo.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_add_page_appends() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", vec![page("Overview", "overview.html")]))
        .await
        .unwrap();

    let idea = repo.add_page("campus", page("Costs", "costs.html")).await.unwrap();
    assert_eq!(idea.pages.last().unwrap().filename, "costs.html");

    let reloaded = repo.require("campus").await.unwrap();
    let order: Vec<_> = reloaded.pages.iter().map(|p| p.filename.as_str()).collect();
    assert_eq!(order, ["overview.html", "costs.html"]);

    assert!(matches!(
        repo.add_page("campus", page("Costs", "costs.html")).await,
        Err(Error::Conflict(_))
    ));
}

#[tokio::test]
async fn test_delete_page_removes_file_and_entry() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", three_pages())).await.unwrap();

    repo.delete_page("campus", "alpha.html").await.unwrap();

    assert!(!dir.path().join("campus/pages/alpha.html").exists());
    let reloaded = repo.require("campus").await.unwrap();
    let order: Vec<_> = reloaded.pages.iter().map(|p| p.filename.as_str()).collect();
    assert_eq!(order, ["zeta.html", "middle.html"]);
}

#[tokio::test]
async fn test_delete_page_listed_but_missing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", three_pages())).await.unwrap();
    std::fs::remove_file(dir.path().join("campus/pages/middle.html")).unwrap();

    // Load skips the missing file, so the page does not exist for callers
    assert!(matches!(
        repo.delete_page("campus", "middle.html").await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_last_page_cannot_be_deleted() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", vec![page("Overview", "overview.html")]))
        .await
        .unwrap();
    let before = snapshot(dir.path());

    let result = repo.delete_page("campus", "overview.html").await;
    assert!(matches!(result, Err(Error::LastPage)));
    assert_eq!(snapshot(dir.path()), before);
}

#[tokio::test]
async fn test_page_count_never_drops_below_one() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", vec![page("P0", "p0.html")]))
        .await
        .unwrap();

    for i in 1..4 {
        repo.add_page("campus", page(&format!("P{}", i), &format!("p{}.html", i)))
            .await
            .unwrap();
    }

    for filename in ["p0.html", "p2.html", "p3.html", "p1.html"] {
        let _ = repo.delete_page("campus", filename).await;
        let idea = repo.require("campus").await.unwrap();
        assert!(!idea.pages.is_empty());
    }

    let idea = repo.require("campus").await.unwrap();
    assert_eq!(idea.pages.len(), 1);
    assert_eq!(idea.pages[0].filename, "p1.html");
}

#[tokio::test]
async fn test_reorder_pages_persists() {
    let dir = TempDir::new().unwrap();
    let repo = FsIdeaRepository::new(dir.path());
    repo.save(&sample_idea("campus", three_pages())).await.unwrap();

    let order = vec![
        "alpha.html".to_string(),
        "middle.html".to_string(),
        "zeta.html".to_string(),
    ];
    repo.reorder_pages("campus", &order).await.unwrap();

    let reloaded = repo.require("campus").await.unwrap();
    let names: Vec<_> = reloaded.pages.iter().map(|p| p.filename.clone()).collect();
    assert_eq!(names, order);

    let bad = vec!["alpha.html".to_string()];
    assert!(matches!(
        repo.reorder_pages("campus", &bad).await,
        Err(Error::Validation(_))
    ));
}
