//! Readback checks on programmed flash.
//!
//! Both operations read through the service in small chunks on the
//! stack, so they work on arbitrarily large images without a buffer.
use crate::{
    devices::flash::FlashService,
    error::Error,
    hal::flash::{Address, Flash},
};
use core::cmp::min;
use crc::{crc32, Hasher32};

/// Bytes read back from flash per driver call.
const CHUNK_SIZE: usize = 64;

/// Compares the flash contents at `address` against `expected`.
///
/// Fails with the address of the first differing byte.
pub fn verify<F: Flash>(
    service: &mut FlashService<F>,
    address: Address,
    expected: &[u8],
) -> Result<(), Error> {
    let mut buffer = [0u8; CHUNK_SIZE];
    for (index, chunk) in expected.chunks(CHUNK_SIZE).enumerate() {
        let chunk_address = address + index * CHUNK_SIZE;
        let readback = &mut buffer[..chunk.len()];
        service.read(chunk_address, readback)?;
        if let Some(offset) = readback.iter().zip(chunk).position(|(read, wanted)| read != wanted) {
            let mismatch = chunk_address + offset;
            log!(warn, "Flash verification failed at {:?}", mismatch.0);
            return Err(Error::VerifyFailure(mismatch));
        }
    }
    Ok(())
}

/// CRC-32 (IEEE) of `length` bytes of flash starting at `address`.
pub fn checksum<F: Flash>(
    service: &mut FlashService<F>,
    address: Address,
    length: u32,
) -> Result<u32, Error> {
    let mut digest = crc32::Digest::new(crc32::IEEE);
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut cursor = address;
    let mut remaining = length as usize;
    while remaining > 0 {
        let readback = &mut buffer[..min(remaining, CHUNK_SIZE)];
        service.read(cursor, readback)?;
        digest.write(readback);
        cursor = cursor + readback.len();
        remaining -= readback.len();
    }
    Ok(digest.sum32())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hal::{
        doubles::flash::FakeFlash,
        flash::Info,
    };

    const GEOMETRY: Info =
        Info { start: Address(0x0800_0000), size: 0x1_0000, sector_size: 0x400, sector_count: 64 };

    fn image() -> Vec<u8> { (0..300u32).map(|i| (i * 7) as u8).collect() }

    #[test]
    fn matching_image_verifies() {
        // Given
        let mut flash = FakeFlash::new(GEOMETRY);
        let mut service = FlashService::new(&mut flash);
        let image = image();
        service.program(Address(0x0800_0400), &image).unwrap();

        // Then
        assert_eq!(verify(&mut service, Address(0x0800_0400), &image), Ok(()));
    }

    #[test]
    fn first_mismatch_is_located() {
        // Given
        let mut flash = FakeFlash::new(GEOMETRY);
        let image = image();
        FlashService::new(&mut flash).program(Address(0x0800_0400), &image).unwrap();
        flash.data[0x400 + 130] ^= 0x01;
        flash.data[0x400 + 200] ^= 0x01;

        // When
        let mut service = FlashService::new(&mut flash);
        let result = verify(&mut service, Address(0x0800_0400), &image);

        // Then
        assert_eq!(result, Err(Error::VerifyFailure(Address(0x0800_0400 + 130))));
    }

    #[test]
    fn checksum_matches_reference_crc() {
        // Given
        let mut flash = FakeFlash::new(GEOMETRY);
        let mut service = FlashService::new(&mut flash);
        service.program(Address(0x0800_0000), b"123456789").unwrap();

        // Then (CRC-32/IEEE check value)
        assert_eq!(checksum(&mut service, Address(0x0800_0000), 9), Ok(0xCBF4_3926));
        assert_eq!(checksum(&mut service, Address(0x0800_0000), 0), Ok(0));
    }

    #[test]
    fn checksum_spans_several_chunks() {
        let mut flash = FakeFlash::new(GEOMETRY);
        let mut service = FlashService::new(&mut flash);
        let image = image();
        service.program(Address(0x0800_0000), &image).unwrap();

        let mut digest = crc32::Digest::new(crc32::IEEE);
        digest.write(&image);
        assert_eq!(checksum(&mut service, Address(0x0800_0000), 300), Ok(digest.sum32()));
    }

    #[test]
    fn readback_needs_the_read_capability() {
        let mut flash = FakeFlash::new(GEOMETRY);
        flash.supports_read = false;
        let mut service = FlashService::new(&mut flash);

        assert_eq!(verify(&mut service, Address(0x0800_0000), &[0xFF]), Err(Error::Unsupported));
        assert_eq!(checksum(&mut service, Address(0x0800_0000), 4), Err(Error::Unsupported));
    }
}
