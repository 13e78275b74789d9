//! Utilities to manipulate generic memory
use core::cmp::min;

/// Whether `value` is a whole multiple of `alignment`. Nothing is
/// aligned to zero.
pub const fn is_aligned(value: u32, alignment: u32) -> bool {
    alignment != 0 && value % alignment == 0
}

/// Iterator over the pieces of a byte block that fall in each sector
/// of a uniformly sectored memory.
///
/// Yields `(sector index, piece address, piece)` triplets. Sector
/// indices count from the memory origin.
pub struct SectorChunks<'a> {
    block: &'a [u8],
    address: u32,
    origin: u32,
    sector_size: u32,
}

/// Anything that can be sliced in pieces, each one contained in a
/// single fixed-size sector.
pub trait IterableBySectors<'a> {
    /// `address` is where the block starts, and must not be below `origin`.
    fn chunks_per_sector(&self, address: u32, origin: u32, sector_size: u32) -> SectorChunks<'a>;
}

impl<'a> IterableBySectors<'a> for &'a [u8] {
    fn chunks_per_sector(&self, address: u32, origin: u32, sector_size: u32) -> SectorChunks<'a> {
        SectorChunks { block: self, address, origin, sector_size }
    }
}

impl<'a> Iterator for SectorChunks<'a> {
    type Item = (u32, u32, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.block.is_empty() || self.sector_size == 0 {
            return None;
        }

        let offset = self.address.saturating_sub(self.origin);
        let sector = offset / self.sector_size;
        let room = (self.sector_size - offset % self.sector_size) as usize;
        let (piece, rest) = self.block.split_at(min(room, self.block.len()));

        let address = self.address;
        self.block = rest;
        self.address += piece.len() as u32;
        Some((sector, address, piece))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alignment_checks() {
        assert!(is_aligned(0x0800_0400, 1024));
        assert!(is_aligned(0, 4));
        assert!(!is_aligned(6, 4));
        assert!(!is_aligned(8, 0));
    }

    #[test]
    fn block_inside_a_single_sector() {
        // Given
        let memory = [0xAAu8; 16];
        let block = &memory[..];

        // When
        let chunks: Vec<_> = block.chunks_per_sector(0x110, 0x100, 0x40).collect();

        // Then
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], (0, 0x110, &memory[..]));
    }

    #[test]
    fn block_straddling_sectors_starting_in_the_middle() {
        // Given
        let memory = [0u8; 0x90];
        let block = &memory[..];

        // When
        let chunks: Vec<_> = block.chunks_per_sector(0x120, 0x100, 0x40).collect();

        // Then
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], (0, 0x120, &memory[0x00..0x20]));
        assert_eq!(chunks[1], (1, 0x140, &memory[0x20..0x60]));
        assert_eq!(chunks[2], (2, 0x180, &memory[0x60..0x90]));
    }

    #[test]
    fn empty_block_yields_nothing() {
        let block: &[u8] = &[];
        assert_eq!(block.chunks_per_sector(0, 0, 0x40).count(), 0);
    }
}
