// src/extract/mod.rs
// =============================================================================
// Extraction engines: everything that turns a response body into candidates.
//
// Submodules:
// - decode: percent / unicode-escape / entity normalisation of raw bodies
// - linkfinder: quoted URLs and paths inside scripts and data files
// - subdomain: host names under the target's registrable domain
// - bucket: S3 bucket endpoints
// - html: href / form / upload / src extraction from HTML pages
//
// Every function here is pure: same body in, same candidates out, no shared
// state. Deduplication across responses is the DedupRegistry's job.
// =============================================================================

mod bucket;
mod decode;
mod html;
mod linkfinder;
mod subdomain;

pub use bucket::find_buckets;
pub use decode::decode_body;
pub use html::{parse_page, resolve};
pub use linkfinder::find_links;
pub use subdomain::SubdomainFinder;
