//! Transaction calldata helpers.
//!
//! - First 4 bytes of calldata = keccak256(function_signature)[:4] (the selector)
//! - Remaining bytes = ABI-encoded inputs, one 32-byte word per static argument
//!
//! Only static arguments are read positionally here. Every access is bounds
//! checked against the declared word count.

use alloy_primitives::{Address, U256};

use crate::error::AbiError;
use crate::interfaces::ContractInterface;

pub type Selector = [u8; 4];

const WORD: usize = 32;

/// The 4-byte selector of `input`, or `None` when the input is shorter.
pub fn selector(input: &[u8]) -> Option<Selector> {
    input.get(..4)?.try_into().ok()
}

/// Fixed-width view over the arguments of a call.
#[derive(Debug, Clone, Copy)]
pub struct CallArgs<'a> {
    args: &'a [u8],
    words: usize,
}

impl<'a> CallArgs<'a> {
    /// Require `words` full argument words after the selector.
    pub fn parse(input: &'a [u8], words: usize) -> Result<Self, AbiError> {
        let expected = 4 + words * WORD;
        if input.len() < expected {
            return Err(AbiError::Truncated {
                expected,
                actual: input.len(),
            });
        }
        Ok(Self {
            args: &input[4..expected],
            words,
        })
    }

    pub fn word(&self, index: usize) -> Result<&'a [u8], AbiError> {
        if index >= self.words {
            return Err(AbiError::Truncated {
                expected: 4 + (index + 1) * WORD,
                actual: 4 + self.args.len(),
            });
        }
        Ok(&self.args[index * WORD..(index + 1) * WORD])
    }

    /// Low 20 bytes of the word at `index`.
    pub fn address(&self, index: usize) -> Result<Address, AbiError> {
        Ok(Address::from_slice(&self.word(index)?[12..]))
    }

    pub fn uint(&self, index: usize) -> Result<U256, AbiError> {
        Ok(U256::from_be_slice(self.word(index)?))
    }
}

/// Maps selectors of an interface to caller-defined call variants.
#[derive(Debug, Clone)]
pub struct SelectorMap<T> {
    entries: Vec<(Selector, T)>,
}

impl<T: Copy> SelectorMap<T> {
    /// Resolve each `(function name, variant)` pair against `iface`.
    pub fn build(iface: &ContractInterface, calls: &[(&str, T)]) -> Result<Self, AbiError> {
        let entries = calls
            .iter()
            .map(|(name, call)| Ok((iface.selector(name)?, *call)))
            .collect::<Result<Vec<_>, AbiError>>()?;
        Ok(Self { entries })
    }

    pub fn lookup(&self, input: &[u8]) -> Option<T> {
        let sel = selector(input)?;
        self.entries
            .iter()
            .find(|(s, _)| *s == sel)
            .map(|(_, call)| *call)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
