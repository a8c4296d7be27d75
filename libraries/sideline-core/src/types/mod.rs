mod ids;
mod letter;
mod library;
mod tile;
mod toggles;

pub use ids::{BlobId, ClipHandle, TileId};
pub use letter::Letter;
pub use library::{LetterBucket, Library, LibraryRecord, Selection, TileLocation};
pub use tile::{NewTile, SourceKind, Tile};
pub use toggles::{ToggleFlag, Toggles};
