//! `FabricFlow` generates capacitated data-center fabrics (Clos and block-to-block), computes the
//! maximum flow between randomly chosen groups of servers, and annotates each link with the flow
//! it carries. The most common entry point is [`core::run()`].

#![warn(unreachable_pub, missing_docs)]

pub mod core;
pub mod utils;
