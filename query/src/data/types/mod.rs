//! Ordering and paging types shared by the repositories

mod page;
mod sort;

pub(crate) use page::known_total;
pub use page::{Page, PageRequest};
pub use sort::{Direction, NullHandling, Order, Sort};
