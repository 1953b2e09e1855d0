//! Built-in sample ideas for a fresh installation

use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use crate::error::Result;
use crate::models::{Idea, IdeaType, Page, Visibility};
use crate::repository::IdeaRepository;

struct SeedPage {
    title: &'static str,
    filename: &'static str,
    content: &'static str,
}

struct SeedIdea {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    pages: &'static [SeedPage],
}

const SEED_IDEAS: &[SeedIdea] = &[
    SeedIdea {
        id: "educational-reels-generator",
        name: "Educational Reels Generator",
        description: "An AI-powered app that transforms lengthy educational videos into bite-sized, engaging reels tailored to personalized learning roadmaps.",
        pages: &[
            SeedPage {
                title: "Hackathon Pitch",
                filename: "hackathon-pitch.html",
                content: include_str!("../seed/educational-reels-pitch.html"),
            },
            SeedPage {
                title: "Implementation",
                filename: "implementation.html",
                content: include_str!("../seed/educational-reels-implementation.html"),
            },
        ],
    },
    SeedIdea {
        id: "smart-campus-navigator",
        name: "Smart Campus Navigator",
        description: "An AR-powered mobile app that helps students and visitors navigate university campuses with real-time directions, building information, and event discovery.",
        pages: &[SeedPage {
            title: "Overview",
            filename: "overview.html",
            content: include_str!("../seed/smart-campus-overview.html"),
        }],
    },
    SeedIdea {
        id: "ecotrack-carbon-footprint-tracker",
        name: "EcoTrack - Carbon Footprint Tracker",
        description: "A personal carbon footprint tracking app that automatically calculates your environmental impact from daily activities and provides actionable reduction strategies.",
        pages: &[SeedPage {
            title: "Overview",
            filename: "overview.html",
            content: include_str!("../seed/ecotrack-overview.html"),
        }],
    },
];

fn seed_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 11, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// The sample ideas, authored by `admin`, public and approved
pub fn sample_ideas() -> Vec<Idea> {
    SEED_IDEAS
        .iter()
        .map(|seed| Idea {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            author: "admin".to_string(),
            description: seed.description.to_string(),
            visibility: Visibility::Public,
            approved: true,
            created_at: seed_created_at(),
            idea_type: IdeaType::Hackathon,
            pages: seed
                .pages
                .iter()
                .map(|p| Page {
                    title: p.title.to_string(),
                    content: p.content.to_string(),
                    filename: p.filename.to_string(),
                })
                .collect(),
        })
        .collect()
}

/// Write every sample idea whose id is not taken yet. Returns how many were written.
pub async fn seed_repository(repo: &dyn IdeaRepository) -> Result<usize> {
    let mut written = 0;
    for idea in sample_ideas() {
        if repo.exists(&idea.id).await? {
            continue;
        }
        repo.save(&idea).await?;
        info!(idea_id = %idea.id, "Seeded sample idea");
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::has_h1;
    use crate::slug::slugify;

    #[test]
    fn test_sample_ideas_are_well_formed() {
        for idea in sample_ideas() {
            assert_eq!(idea.id, slugify(&idea.name));
            assert!(!idea.pages.is_empty());
            for page in &idea.pages {
                assert!(has_h1(&page.content), "{} lacks <h1>", page.filename);
            }
        }
    }
}
