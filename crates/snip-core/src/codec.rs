use crate::token::Token;

/// Reversible mapping between record ids and public tokens.
///
/// `decode(encode(id).as_str()) == Some(id)` must hold for every id.
/// `decode` returns `None` for anything the codec did not produce itself;
/// it never says why.
pub trait IdCodec: Send + Sync + 'static {
    fn encode(&self, id: u64) -> Token;

    fn decode(&self, token: &str) -> Option<u64>;
}
