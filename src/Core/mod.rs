pub mod arch;
pub mod atomics;
pub mod error;
pub mod rdcss;
pub mod tagged;

pub use arch::{arch, round_up_power_of_two, ArchConfig};
pub use atomics::{cas_slot, read_slot, set_slot_if_empty, slot_address, EMPTY};
pub use rdcss::{is_descriptor, rdcss, rdcss_outcome, Outcome};
pub use tagged::{get_tag, has_tag, tag, untag};
