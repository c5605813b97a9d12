use serde::Serialize;

/// One slice of an ordered result set plus what a client needs to page through the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub page: u32,
    pub size: u32,
    /// True when no page follows this one.
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, page: u32, size: u32) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(size))
        };

        Page {
            content,
            total_elements,
            total_pages,
            page,
            size,
            last: u64::from(page) + 1 >= total_pages,
        }
    }
}
