// Card rendering service: text in, ordered page images out.
// Pagination and composition live in `layout`; this module wires them to config and HTTP.

pub mod handlers;
pub mod pipeline;
