mod builder;
mod error;
mod io;
mod mdp;
mod pomdp;
mod spec;

pub use builder::{MdpBuilder, PomdpBuilder};
pub use error::ModelError;
pub use io::{compile_yaml, load_yaml, save_yaml};
pub use mdp::{SparseMdp, SuccessorIter};
pub use pomdp::{BeliefSet, SparsePomdp, SupportIter};
pub use spec::{ActionSpec, MdpSpec, OutcomeSpec, StateSpec};
