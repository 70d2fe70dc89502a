/// What kind of external item a [`BindingEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Type,
    Module,
    CompilationUnit,
}

/// An external type, module or compilation unit answered for the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingEvent<'a> {
    pub kind: BindingKind,
    /// Qualified type name, module name, or unit URI.
    pub name: &'a str,
    /// URI of the file the item was read from.
    pub origin: &'a str,
}

/// Observer invoked synchronously, in resolution order. Listeners only get
/// shared references and cannot influence resolution.
pub trait BindingListener {
    fn binding_answered(&self, event: &BindingEvent<'_>);
}

impl<F> BindingListener for F
where
    F: Fn(&BindingEvent<'_>),
{
    fn binding_answered(&self, event: &BindingEvent<'_>) {
        self(event)
    }
}
