pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{denied, dim, due_date, error, granted, header, info, success, summary_row, warn};
pub use table::{book_table, card_table};
pub use theme::{theme, Theme};
