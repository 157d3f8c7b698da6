//! Heap-allocated word array with a bincode `Decode` implementation that reads straight into heap
//! memory.
//!
//! `#[derive(Decode)]` on `Box<[u16; LEN]>` decodes onto the stack and then moves to the heap,
//! which can overflow the stack for the 64K-word video RAM.

use bincode::de::{BorrowDecoder, Decoder};
use bincode::error::DecodeError;
use bincode::{BorrowDecode, Decode, Encode};
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Encode)]
pub struct BoxedWordArray<const LEN: usize>(Box<[u16; LEN]>);

impl<const LEN: usize> BoxedWordArray<LEN> {
    #[must_use]
    pub fn new() -> Self {
        Self(zeroed_words())
    }
}

impl<const LEN: usize> Default for BoxedWordArray<LEN> {
    fn default() -> Self {
        Self::new()
    }
}

fn zeroed_words<const LEN: usize>() -> Box<[u16; LEN]> {
    match vec![0_u16; LEN].into_boxed_slice().try_into() {
        Ok(array) => array,
        Err(_) => unreachable!("vec was allocated with exactly {LEN} words"),
    }
}

impl<const LEN: usize, Context> Decode<Context> for BoxedWordArray<LEN> {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let mut array = zeroed_words::<LEN>();
        for word in array.iter_mut() {
            *word = u16::decode(decoder)?;
        }

        Ok(Self(array))
    }
}

impl<'de, const LEN: usize, Context> BorrowDecode<'de, Context> for BoxedWordArray<LEN> {
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        let mut array = zeroed_words::<LEN>();
        for word in array.iter_mut() {
            *word = u16::decode(decoder)?;
        }

        Ok(Self(array))
    }
}

impl<const LEN: usize> Deref for BoxedWordArray<LEN> {
    type Target = [u16; LEN];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const LEN: usize> DerefMut for BoxedWordArray<LEN> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn save_state_round_trip_keeps_contents() {
        let mut words = BoxedWordArray::<0x100>::new();
        words[0x00] = 0xFFFF;
        words[0x7F] = 0x1234;

        let config = bincode::config::standard();
        let bytes = bincode::encode_to_vec(&words, config).unwrap();
        let (decoded, _): (BoxedWordArray<0x100>, _) =
            bincode::decode_from_slice(&bytes, config).unwrap();

        assert_eq!(decoded[0x00], 0xFFFF);
        assert_eq!(decoded[0x7F], 0x1234);
        assert!(decoded[0x80..].iter().all(|&word| word == 0));
    }
}
