pub struct Icons;

impl Icons {
    pub const BOOKS: &str = "📚";
    pub const CARD: &str = "🪪";
    pub const SEARCH: &str = "🔍";
    pub const CHECK: &str = "✅";
    pub const WARN: &str = "⚠️";
    pub const ERROR: &str = "❌";
    pub const INFO: &str = "ℹ️";
    pub const DATABASE: &str = "🗄️";
    pub const RETURN: &str = "↩️";
    pub const GLOBE: &str = "🌍";
    pub const EMPTY: &str = "∅";
}
