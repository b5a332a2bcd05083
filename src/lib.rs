/// Use mimalloc as the global allocator for all binaries.
/// The distinct set makes one small allocation per line, which glibc
/// malloc handles poorly at hundreds of millions of lines.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod dedup;
pub mod gendata;
