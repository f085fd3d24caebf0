// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt, io, result};
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use amplify_derive::Display;
use crate::pool::PoolError;

pub type ErrorBox = Box<dyn StdError + Send + Sync>;
pub type Result<T = ()> = result::Result<T, Error>;

/// The writer operation that failed.
#[derive(Copy, Clone, Debug, Default, Display, Eq, PartialEq)]
pub enum OperationKind {
	#[default]
	#[display("unknown operation")]
	Unknown,
	#[display("create writer")]
	Create,
	#[display("reserve space")]
	Reserve,
	#[display("advance cursor")]
	Advance,
	#[display("write to writer")]
	Write,
	#[display("read written data")]
	Read,
	#[display("dispose writer")]
	Dispose,
	#[display("{0}")]
	Other(&'static str)
}

#[derive(Copy, Clone, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
	#[display("invalid configuration")]
	InvalidConfiguration,
	#[display("advanced past the end of the buffer")]
	InvalidAdvance,
	#[display("required capacity exceeds the maximum buffer size")]
	CapacityOverflow,
	#[display("writer was disposed")]
	ObjectDisposed,
	#[display("pool could not provide a buffer")]
	AllocationFailure,
	#[display("memory handle outlived its buffer")]
	StaleMemory,
	#[display("{0}")]
	Other(&'static str),
}

#[derive(Debug)]
pub struct Error {
	op: OperationKind,
	kind: ErrorKind,
	source: Option<ErrorBox>,
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let Self { op, kind, source } = self;
		if let Some(source) = source {
			write!(f, "{op} failed; {kind} ({source})")
		} else {
			write!(f, "{op} failed; {kind}")
		}
	}
}

impl StdError for Error {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		if let Some(ref source) = self.source {
			Some(source.as_ref())
		} else {
			None
		}
	}
}

impl Error {
	pub(crate) fn new(
		op: OperationKind,
		kind: ErrorKind,
		source: Option<ErrorBox>
	) -> Self {
		Self { op, kind, source }
	}

	/// Creates a new error with a custom message.
	pub fn other(
		op: OperationKind,
		message: &'static str,
		source: Option<ErrorBox>
	) -> Self {
		Self::new(op, ErrorKind::Other(message), source)
	}

	/// Creates a new "invalid configuration" error.
	pub fn invalid_config(message: &'static str) -> Self {
		Self::new(OperationKind::Create, ErrorKind::InvalidConfiguration, Some(message.into()))
	}

	/// Creates a new "invalid advance" error for a `count` beyond `available`
	/// uncommitted items.
	pub fn invalid_advance(count: usize, available: usize) -> Self {
		Self::new(
			OperationKind::Advance,
			ErrorKind::InvalidAdvance,
			Some(format!("cannot advance {count} items with {available} available").into())
		)
	}

	/// Creates a new "capacity overflow" error.
	pub fn capacity_overflow(op: OperationKind) -> Self {
		Self::new(op, ErrorKind::CapacityOverflow, None)
	}

	/// Creates a new "object disposed" error.
	pub fn disposed(op: OperationKind) -> Self {
		Self::new(op, ErrorKind::ObjectDisposed, None)
	}

	/// Creates a new allocation failure from a pool error.
	pub fn pool(op: OperationKind, error: PoolError) -> Self {
		Self::new(op, ErrorKind::AllocationFailure, Some(error.into()))
	}

	/// Creates a new "stale memory" error.
	pub fn stale(op: OperationKind) -> Self {
		Self::new(op, ErrorKind::StaleMemory, None)
	}

	/// Returns the operation kind.
	pub fn operation(&self) -> OperationKind { self.op }

	/// Sets the operation kind.
	pub fn with_operation(mut self, op: OperationKind) -> Self {
		self.op = op;
		self
	}

	/// Returns the error kind.
	pub fn kind(&self) -> ErrorKind { self.kind }

	/// Returns the source downcast into a pool error, if possible.
	pub fn pool_source(&self) -> Option<&PoolError> {
		self.source()?.downcast_ref()
	}

	pub fn is_disposed(&self) -> bool { self.kind == ErrorKind::ObjectDisposed }
}

impl From<Error> for io::Error {
	fn from(value: Error) -> Self {
		let kind = match value.kind {
			ErrorKind::ObjectDisposed => io::ErrorKind::BrokenPipe,
			ErrorKind::AllocationFailure |
			ErrorKind::CapacityOverflow => io::ErrorKind::OutOfMemory,
			_ => io::ErrorKind::Other,
		};
		io::Error::new(kind, value)
	}
}

pub(crate) trait ResultContext<T> {
	/// Sets the operation kind on an error result.
	fn context(self, op: OperationKind) -> Result<T>;
}

impl<T> ResultContext<T> for Result<T> {
	fn context(self, op: OperationKind) -> Result<T> {
		self.map_err(|err| err.with_operation(op))
	}
}
