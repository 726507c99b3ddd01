pub mod error;
pub mod format;
pub mod snapshot;
pub mod configuration;

pub use error::{Result, SnapshotError};
pub use format::record::{MarkerWidth, RecordReader};
pub use snapshot::states::{NVec3, GuidingCenter, BoundParticle, ParticleSet, ParticleFileInfo, MeshPoint, ForceMesh, AmrLevels};
pub use snapshot::header::{load_header, Header};
pub use snapshot::particles::read_particles;
pub use snapshot::mesh::read_mesh;
pub use snapshot::amr::{read_amr, read_amr_dir, read_amr_file};
pub use snapshot::supplementary::{SupplementaryLoader, NoSupplementary};
pub use snapshot::reader::Snapshot;
pub use snapshot::trajectory::{guiding_center_trajectory, TrajectoryPoint};

pub use configuration::config::{ReaderConfig, RecordConfig};
