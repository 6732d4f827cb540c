//! Native functions exported to host scripts
//!
//! ```text
//! native bcrypt_hash(thread_idx, thread_id, const password[], cost);
//! native bcrypt_check(thread_idx, thread_id, const password[], const hash[]);
//! ```
//!
//! Both return 1 when the job was queued and 0 when the call was refused.

use crate::dispatcher::{accepted, Dispatcher};
use crate::errors::{DispatchError, Result};
use crate::job::CallerTag;

pub const BCRYPT_HASH: &str = "bcrypt_hash";
pub const BCRYPT_CHECK: &str = "bcrypt_check";

/// Names of every native this crate registers with a host
pub const NATIVES: [&str; 2] = [BCRYPT_HASH, BCRYPT_CHECK];

const ARGUMENT_COUNT: usize = 4;

/// Argument list of a native call as seen through the host's memory
pub trait NativeArgs {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Integer argument at `position`
    fn int(&self, position: usize) -> Option<i32>;

    /// String argument at `position`, `None` if the host memory could not be read
    fn string(&self, position: usize) -> Option<Vec<u8>>;
}

/// Dispatch a native by name
pub fn call_native(dispatcher: &Dispatcher, name: &str, args: &dyn NativeArgs) -> i32 {
    match name {
        BCRYPT_HASH => bcrypt_hash(dispatcher, args),
        BCRYPT_CHECK => bcrypt_check(dispatcher, args),
        _ => {
            let error = DispatchError::UnknownNative {
                name: name.to_string(),
            };
            accepted(name, Err(error)) as i32
        }
    }
}

pub fn bcrypt_hash(dispatcher: &Dispatcher, args: &dyn NativeArgs) -> i32 {
    accepted(BCRYPT_HASH, try_bcrypt_hash(dispatcher, args)) as i32
}

pub fn bcrypt_check(dispatcher: &Dispatcher, args: &dyn NativeArgs) -> i32 {
    accepted(BCRYPT_CHECK, try_bcrypt_check(dispatcher, args)) as i32
}

fn try_bcrypt_hash(dispatcher: &Dispatcher, args: &dyn NativeArgs) -> Result<()> {
    check_count(BCRYPT_HASH, args)?;
    let tag = read_tag(args);
    let cost = args.int(3).unwrap_or(0);
    let password = read_string(args, 2);
    dispatcher.try_submit_hash(tag, &password, cost)
}

fn try_bcrypt_check(dispatcher: &Dispatcher, args: &dyn NativeArgs) -> Result<()> {
    check_count(BCRYPT_CHECK, args)?;
    let tag = read_tag(args);
    let password = read_string(args, 2);
    let hash = read_string(args, 3);
    dispatcher.try_submit_verify(tag, &password, &hash)
}

fn check_count(native: &'static str, args: &dyn NativeArgs) -> Result<()> {
    if args.len() != ARGUMENT_COUNT {
        return Err(DispatchError::argument_count(native, ARGUMENT_COUNT, args.len()));
    }
    Ok(())
}

fn read_tag(args: &dyn NativeArgs) -> CallerTag {
    CallerTag::new(args.int(0).unwrap_or(0), args.int(1).unwrap_or(0))
}

// Unreadable host strings count as empty input.
fn read_string(args: &dyn NativeArgs, position: usize) -> Vec<u8> {
    args.string(position).unwrap_or_default()
}
