// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # ifc2cloud core parser
//!
//! STEP/IFC reading built with [nom](https://docs.rs/nom) and
//! [memchr](https://docs.rs/memchr).
//!
//! - **Scanning**: [`EntityScanner`] walks the DATA section and yields the id,
//!   type name and byte span of every entity instance without decoding it.
//! - **Indexing**: [`build_entity_index`] maps entity ids to byte spans so
//!   references can be followed in O(1).
//! - **Lazy decoding**: [`EntityDecoder`] tokenizes an entity only when it is
//!   asked for and caches the result.
//!
//! ```rust,ignore
//! use ifc2cloud_core::{EntityDecoder, EntityScanner};
//!
//! let content = "#1=IFCWALL('guid',$,$,$,'Wall-001',$,$,$);";
//! for entity in EntityScanner::new(content) {
//!     println!("#{} {}", entity.id, entity.type_name);
//! }
//!
//! let mut decoder = EntityDecoder::new(content);
//! let wall = decoder.decode_by_id(1)?;
//! assert_eq!(wall.get_string(4), Some("Wall-001"));
//! ```

pub mod decoder;
pub mod error;
pub mod parser;
pub mod schema;
pub mod units;

pub use decoder::{build_entity_index, EntityDecoder, EntityIndex};
pub use error::{Error, Result};
pub use parser::{parse_entity, EntityScanner, ScannedEntity, Token};
pub use schema::{canonical_type_name, AttributeValue, DecodedEntity, IfcType};
pub use units::{extract_length_unit_scale, get_si_prefix_multiplier, length_unit_scale};
