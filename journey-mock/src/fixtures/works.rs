use journey_core::{WorkActivityRecord, WorkBlurb, WorksListPage};

use super::labels;

const PAGES: u32 = 2;

fn blurb(id: u32, title: &str, updated: &str) -> WorkBlurb {
    WorkBlurb {
        url: work_url(id),
        title: title.to_string(),
        updated: updated.to_string(),
    }
}

pub fn work_url(id: u32) -> String {
    format!("https://archive.mock/works/{id}")
}

pub fn listing(page: u32) -> Option<WorksListPage> {
    let works = match page {
        1 => vec![
            blurb(101, "The Long Winter", "30 Jun 2024"),
            blurb(102, "Small Hours", "03 Mar 2023"),
        ],
        2 => vec![blurb(103, "First Light", "20 Aug 2022")],
        _ => return None,
    };
    Some(WorksListPage {
        total_pages: PAGES,
        works,
    })
}

pub fn by_url(url: &str) -> Option<WorkActivityRecord> {
    let id: u32 = url.rsplit('/').next()?.parse().ok()?;
    let rec = match id {
        101 => WorkActivityRecord {
            url: work_url(101),
            title: "The Long Winter".into(),
            published: "2023-06-01".into(),
            updated: Some("30 Jun 2024".into()),
            words: 3660,
            kudos: 120,
            comments: 30,
            hits: 2400,
            fandoms: labels(&["Good Omens"]),
            relationships: labels(&["Aziraphale/Crowley (Good Omens)"]),
            tags: labels(&["Angst", "Major Character Death", "Slow Burn"]),
            kudos_givers: labels(&["alice", "bob"]),
        },
        102 => WorkActivityRecord {
            url: work_url(102),
            title: "Small Hours".into(),
            published: "3 Mar 2023".into(),
            updated: None,
            words: 1200,
            kudos: 40,
            comments: 6,
            hits: 800,
            fandoms: labels(&["Hades (Video Game)"]),
            relationships: Vec::new(),
            tags: labels(&["Fluff", "No Archive Warnings Apply"]),
            kudos_givers: labels(&["alice"]),
        },
        103 => WorkActivityRecord {
            url: work_url(103),
            title: "First Light".into(),
            published: "20 Aug 2022".into(),
            updated: Some("20 Aug 2022".into()),
            words: 500,
            kudos: 5,
            comments: 1,
            hits: 90,
            fandoms: labels(&["Good Omens"]),
            relationships: Vec::new(),
            tags: labels(&["Drabble"]),
            kudos_givers: labels(&["carol"]),
        },
        _ => return None,
    };
    Some(rec)
}
