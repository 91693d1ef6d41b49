//! Binary encoding for governance VM programs, so the bytecode blob a
//! transaction's `data` field carries can be decoded into the
//! `Instruction` sequence the interpreter runs.
//!
//! Grounded on the prior runtime's `wire.rs` length-prefixed framing style
//! (a tag byte followed by a `u32` big-endian length for variable-size
//! payloads) applied to VM operands instead of network frames.

use thiserror::Error;

use crate::ids::{Address, Hash};

use super::interpreter::Instruction;
use super::opcode::Opcode;
use super::value::Value;

const TAG_PUSH: u8 = 0x00;

const VALUE_U64: u8 = 0x01;
const VALUE_I64: u8 = 0x02;
const VALUE_BOOL: u8 = 0x03;
const VALUE_BYTES: u8 = 0x04;
const VALUE_STR: u8 = 0x05;
const VALUE_HASH: u8 = 0x06;
const VALUE_ADDRESS: u8 = 0x07;
const VALUE_NIL: u8 = 0x08;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BytecodeError {
    #[error("unexpected end of bytecode stream")]
    UnexpectedEof,
    #[error("unknown value tag {0:#04x}")]
    UnknownValueTag(u8),
    #[error("unknown instruction tag {0:#04x}")]
    UnknownInstructionTag(u8),
    #[error("string payload was not valid utf-8")]
    InvalidUtf8,
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BytecodeError> {
        let end = self.pos.checked_add(n).ok_or(BytecodeError::UnexpectedEof)?;
        let slice = self.bytes.get(self.pos..end).ok_or(BytecodeError::UnexpectedEof)?;
        self.pos = end;
        Ok(slice)
    }

    fn take_u8(&mut self) -> Result<u8, BytecodeError> {
        Ok(self.take(1)?[0])
    }

    fn take_u32(&mut self) -> Result<u32, BytecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().unwrap()))
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

fn decode_value(cur: &mut Cursor<'_>) -> Result<Value, BytecodeError> {
    match cur.take_u8()? {
        VALUE_U64 => Ok(Value::U64(u64::from_be_bytes(cur.take(8)?.try_into().unwrap()))),
        VALUE_I64 => Ok(Value::I64(i64::from_be_bytes(cur.take(8)?.try_into().unwrap()))),
        VALUE_BOOL => Ok(Value::Bool(cur.take_u8()? != 0)),
        VALUE_BYTES => {
            let len = cur.take_u32()? as usize;
            Ok(Value::Bytes(cur.take(len)?.to_vec()))
        }
        VALUE_STR => {
            let len = cur.take_u32()? as usize;
            let bytes = cur.take(len)?;
            let s = std::str::from_utf8(bytes).map_err(|_| BytecodeError::InvalidUtf8)?;
            Ok(Value::Str(s.to_string()))
        }
        VALUE_HASH => {
            let bytes = cur.take(32)?;
            let mut out = [0u8; 32];
            out.copy_from_slice(bytes);
            Ok(Value::Hash(Hash(out)))
        }
        VALUE_ADDRESS => {
            let bytes = cur.take(32)?;
            let mut out = [0u8; 32];
            out.copy_from_slice(bytes);
            Ok(Value::Address(Address(out)))
        }
        VALUE_NIL => Ok(Value::Nil),
        other => Err(BytecodeError::UnknownValueTag(other)),
    }
}

fn encode_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::U64(v) => {
            out.push(VALUE_U64);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::I64(v) => {
            out.push(VALUE_I64);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::Bool(v) => {
            out.push(VALUE_BOOL);
            out.push(*v as u8);
        }
        Value::Bytes(v) => {
            out.push(VALUE_BYTES);
            out.extend_from_slice(&(v.len() as u32).to_be_bytes());
            out.extend_from_slice(v);
        }
        Value::Str(v) => {
            out.push(VALUE_STR);
            out.extend_from_slice(&(v.len() as u32).to_be_bytes());
            out.extend_from_slice(v.as_bytes());
        }
        Value::Hash(v) => {
            out.push(VALUE_HASH);
            out.extend_from_slice(&v.0);
        }
        Value::Address(v) => {
            out.push(VALUE_ADDRESS);
            out.extend_from_slice(&v.0);
        }
        Value::Nil => out.push(VALUE_NIL),
    }
}

/// Decodes a bytecode blob (a transaction's `data` field) into the
/// instruction sequence the interpreter runs. `Push` instructions carry
/// a typed operand; every other byte in range is an opcode to execute.
pub fn decode_program(bytes: &[u8]) -> Result<Vec<Instruction>, BytecodeError> {
    let mut cur = Cursor::new(bytes);
    let mut program = Vec::new();
    while !cur.is_empty() {
        match cur.take_u8()? {
            TAG_PUSH => program.push(Instruction::Push(decode_value(&mut cur)?)),
            byte => match Opcode::from_byte(byte) {
                Some(opcode) => program.push(Instruction::Exec(opcode)),
                None => return Err(BytecodeError::UnknownInstructionTag(byte)),
            },
        }
    }
    Ok(program)
}

/// Inverse of `decode_program`, used by callers (tests, the CLI demo)
/// that build a program from `Instruction`s and need the wire bytes a
/// transaction's `data` field would carry.
pub fn encode_program(program: &[Instruction]) -> Vec<u8> {
    let mut out = Vec::new();
    for instruction in program {
        match instruction {
            Instruction::Push(value) => {
                out.push(TAG_PUSH);
                encode_value(value, &mut out);
            }
            Instruction::Exec(opcode) => out.push(opcode.to_byte()),
        }
    }
    out
}
