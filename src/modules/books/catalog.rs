//! Starter catalog inserted on first start.

use super::models::NewCopies;

pub fn starter_catalog() -> Vec<NewCopies> {
    vec![
        NewCopies::new("The Great Gatsby", "F. Scott Fitzgerald", "Fiction", 5),
        NewCopies::new(
            "Sapiens: A Brief History of Humankind",
            "Yuval Noah Harari",
            "Non-Fiction",
            3,
        ),
        NewCopies::new("A Brief History of Time", "Stephen Hawking", "Science", 4),
        NewCopies::new("The Innovators", "Walter Isaacson", "Technology", 2),
    ]
}
