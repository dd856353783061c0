// Each domain contains: mod.rs, resolvers.rs, types.rs and, where writes
// span several tables, service.rs

pub mod assistant;
pub mod profiles;
pub mod registrations;
pub mod tournaments;
