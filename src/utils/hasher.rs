use std::io::{Error, Write};

use sha1::Sha1;

pub struct WriteHasher {
    hash: Sha1,
}

impl WriteHasher {
    pub fn new() -> WriteHasher {
        WriteHasher { hash: Sha1::new() }
    }

    pub fn digest_hex(self) -> String {
        self.hash.hexdigest()
    }
}

impl Write for WriteHasher {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        self.hash.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }
}
