// Adapters layer: concrete implementations of the domain ports over HTTP.

pub mod rakuten;
pub mod supabase;

pub use rakuten::RakutenClient;
pub use supabase::SupabaseSink;
