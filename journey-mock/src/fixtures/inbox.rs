use journey_core::{InboxEntry, InboxPage};

const PAGES: u32 = 2;

fn entry(commenter: Option<&str>, timestamp: &str) -> InboxEntry {
    InboxEntry {
        commenter: commenter.map(str::to_string),
        timestamp: timestamp.to_string(),
    }
}

pub fn page(page: u32, identity: &str) -> Option<InboxPage> {
    let entries = match page {
        1 => vec![
            entry(Some("alice"), "Sat 10 Feb 2024 09:12PM"),
            entry(Some("alice"), "Fri 09 Feb 2024 11:40AM"),
            entry(Some("Reply"), "Thu 08 Feb 2024 08:00AM"),
            entry(Some(identity), "Thu 01 Feb 2024 10:05PM"),
            entry(None, "Fri 05 Jan 2024 01:00PM"),
        ],
        2 => vec![
            entry(Some("bob"), "Wed 15 Nov 2023 06:30PM"),
            entry(Some("carol"), "Wed 02 Mar 2022 02:15PM"),
        ],
        _ => return None,
    };
    Some(InboxPage {
        total_pages: PAGES,
        entries,
    })
}
