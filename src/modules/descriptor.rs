use crate::ast::{ModuleDecl, ModuleDirective};
use crate::parser::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Requires {
    pub module: String,
    pub transitive: bool,
    pub is_static: bool,
    /// Span of the module name.
    pub span: Span,
}

/// `exports p [to a, b]` or `opens p [to a, b]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageGrant {
    pub package: String,
    /// Empty for an unqualified grant.
    pub targets: Vec<String>,
    pub span: Span,
}

impl PackageGrant {
    pub fn grants_to(&self, module: Option<&str>) -> bool {
        match module {
            _ if self.targets.is_empty() => true,
            Some(name) => self.targets.iter().any(|t| t == name),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Provides {
    pub service: String,
    pub implementations: Vec<String>,
}

/// Declared relationships of one named module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDescriptor {
    pub name: String,
    pub is_open: bool,
    pub requires: Vec<Requires>,
    pub exports: Vec<PackageGrant>,
    pub opens: Vec<PackageGrant>,
    pub uses: Vec<String>,
    pub provides: Vec<Provides>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_open: false,
            requires: Vec::new(),
            exports: Vec::new(),
            opens: Vec::new(),
            uses: Vec::new(),
            provides: Vec::new(),
        }
    }

    pub fn from_decl(decl: &ModuleDecl) -> Self {
        let mut descriptor = Self::new(decl.name.clone());
        descriptor.is_open = decl.is_open;
        for directive in &decl.directives {
            match directive {
                ModuleDirective::Requires { module, transitive, is_static, .. } => {
                    descriptor.requires.push(Requires {
                        module: module.name.clone(),
                        transitive: *transitive,
                        is_static: *is_static,
                        span: module.span,
                    });
                }
                ModuleDirective::Exports { package, targets, span } => {
                    descriptor.exports.push(PackageGrant {
                        package: package.name.clone(),
                        targets: targets.iter().map(|t| t.name.clone()).collect(),
                        span: *span,
                    });
                }
                ModuleDirective::Opens { package, targets, span } => {
                    descriptor.opens.push(PackageGrant {
                        package: package.name.clone(),
                        targets: targets.iter().map(|t| t.name.clone()).collect(),
                        span: *span,
                    });
                }
                ModuleDirective::Uses { service, .. } => descriptor.uses.push(service.name.clone()),
                ModuleDirective::Provides { service, implementations, .. } => {
                    descriptor.provides.push(Provides {
                        service: service.name.clone(),
                        implementations: implementations.iter().map(|i| i.name.clone()).collect(),
                    });
                }
            }
        }
        descriptor
    }

    pub fn requires_module(mut self, name: &str, transitive: bool) -> Self {
        self.requires.push(Requires {
            module: name.to_string(),
            transitive,
            is_static: false,
            span: Span::default(),
        });
        self
    }

    pub fn exports_package(mut self, package: &str, targets: &[&str]) -> Self {
        self.exports.push(PackageGrant {
            package: package.to_string(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            span: Span::default(),
        });
        self
    }

    /// Whether `package` is exported to the module named `reader`
    /// (`None` is the unnamed module).
    pub fn exports_to(&self, package: &str, reader: Option<&str>) -> bool {
        self.exports
            .iter()
            .any(|grant| grant.package == package && grant.grants_to(reader))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_java;

    #[test]
    fn reads_directives_from_declaration() {
        let unit = parse_java(
            "module mod.one { requires transitive mod.two; exports p to mod.three, mod.one; exports q; uses s.S; }",
        )
        .expect("module-info parses");
        let decl = unit.module_decl.as_ref().expect("module declaration");
        let descriptor = ModuleDescriptor::from_decl(decl);
        assert_eq!(descriptor.name, "mod.one");
        assert!(descriptor.requires[0].transitive);
        assert!(descriptor.exports_to("p", Some("mod.one")));
        assert!(!descriptor.exports_to("p", Some("mod.two")));
        assert!(!descriptor.exports_to("p", None));
        assert!(descriptor.exports_to("q", None));
        assert_eq!(descriptor.uses, vec!["s.S".to_string()]);
    }
}
