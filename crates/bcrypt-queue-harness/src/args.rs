//! Native call arguments as a script would pass them

use bcrypt_queue_core::NativeArgs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeArg {
    Int(i32),
    Str(Vec<u8>),
    /// A string address the host cannot read
    BadAddress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptArgs(Vec<NativeArg>);

impl ScriptArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn int(mut self, value: i32) -> Self {
        self.0.push(NativeArg::Int(value));
        self
    }

    pub fn string<S: AsRef<[u8]>>(mut self, value: S) -> Self {
        self.0.push(NativeArg::Str(value.as_ref().to_vec()));
        self
    }

    pub fn bad_address(mut self) -> Self {
        self.0.push(NativeArg::BadAddress);
        self
    }

    /// `bcrypt_hash(thread_idx, thread_id, password[], cost)`
    pub fn hash<S: AsRef<[u8]>>(index: i32, id: i32, password: S, cost: i32) -> Self {
        Self::new().int(index).int(id).string(password).int(cost)
    }

    /// `bcrypt_check(thread_idx, thread_id, password[], hash[])`
    pub fn check<P: AsRef<[u8]>, H: AsRef<[u8]>>(index: i32, id: i32, password: P, hash: H) -> Self {
        Self::new().int(index).int(id).string(password).string(hash)
    }
}

impl NativeArgs for ScriptArgs {
    fn len(&self) -> usize {
        self.0.len()
    }

    // Script cells are untyped; a string argument read as an integer yields
    // its address, which is meaningless here.
    fn int(&self, position: usize) -> Option<i32> {
        match self.0.get(position)? {
            NativeArg::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn string(&self, position: usize) -> Option<Vec<u8>> {
        match self.0.get(position)? {
            NativeArg::Str(v) => Some(v.clone()),
            _ => None,
        }
    }
}
