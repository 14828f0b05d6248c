pub mod arxiv;
pub mod doi;

/// An external identifier that can be recognised in free-form bibliography text.
pub trait Identifier<'a>: Sized + 'a {
    fn parse(identifier: &'a str) -> Option<Self>;
}
