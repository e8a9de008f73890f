pub mod history;
pub mod inbox;
pub mod works;

pub fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
