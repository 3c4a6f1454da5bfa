#[macro_use]
extern crate afl;
extern crate antfs;
use antfs::directory::Directory;

fn main() {
    fuzz!(|data: &[u8]| {
        if let Ok(directory) = Directory::decode(data) {
            let encoded = directory.encode().expect("Decoded directory failed to encode");
            // Whole records survive, a trailing partial record is dropped
            assert_eq!(encoded.len(), directory.encoded_len());
            assert_eq!(encoded[..16], data[..16]);
            let _ = directory.to_string();
        }
    });
}
