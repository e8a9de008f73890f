use journey_core::{ReadingEntry, ReadingsPage};

use super::labels;

const PAGES: u32 = 2;

#[allow(clippy::too_many_arguments)]
fn read(
    title: &str,
    author: &str,
    visited: &str,
    visits: u32,
    words: u64,
    rating: &str,
    fandom: &str,
    tags: &[&str],
) -> ReadingEntry {
    let slug: String = title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect::<String>()
        .to_ascii_lowercase();
    ReadingEntry {
        title: Some(title.to_string()),
        url: Some(format!("https://archive.mock/works/{slug}")),
        author: Some(author.to_string()),
        last_visited: format!("Last visited: {visited}"),
        visits: Some(visits),
        words,
        rating: Some(rating.to_string()),
        fandoms: labels(&[fandom]),
        relationships: Vec::new(),
        tags: labels(tags),
    }
}

pub fn page(page: u32) -> Option<ReadingsPage> {
    let entries = match page {
        1 => vec![
            read(
                "Tea for Two",
                "quillpen",
                "25 Dec 2024",
                3,
                12_000,
                "General Audiences",
                "Good Omens",
                &["Fluff"],
            ),
            read(
                "Ashes",
                "emberlight",
                "14 Nov 2024",
                1,
                45_000,
                "Explicit",
                "Hades (Video Game)",
                &["Angst", "Graphic Depictions Of Violence"],
            ),
            read(
                "Tea for Two",
                "quillpen",
                "02 Oct 2024",
                2,
                12_000,
                "General Audiences",
                "Good Omens",
                &["Fluff"],
            ),
        ],
        2 => vec![
            read(
                "Paper Boats",
                "quillpen",
                "30 Jun 2023",
                4,
                8_000,
                "Mature",
                "Good Omens",
                &["Hurt/Comfort"],
            ),
            read(
                "Old Roads",
                "wanderer",
                "11 Jan 2022",
                1,
                3_000,
                "Teen And Up Audiences",
                "Hades (Video Game)",
                &["Road Trip"],
            ),
        ],
        _ => return None,
    };
    Some(ReadingsPage {
        total_pages: PAGES,
        entries,
    })
}
