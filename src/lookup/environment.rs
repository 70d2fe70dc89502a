//! The binding arena and type lookup across sources, providers and modules.
//!
//! Types are created once per (qualified name, owning module) and answered
//! by [`TypeId`], so two lookups of the same type compare equal. Sources are
//! searched before providers; among providers of one module the first one
//! that declares the type wins.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use crate::ast::{
    Annotation, CompilationUnit, Expr, FieldDecl, ImportDecl, Literal, MethodDecl, ModuleDecl, Modifier, TypeDecl,
    TypeKind, TypeRef, UnaryOp,
};
use crate::config::Config;
use crate::consts::{JAVA_LANG, LOOKUP_MAX_HIERARCHY_DEPTH, OBJECT};
use crate::error::{Error, Result};
use crate::modules::{ModuleDescriptor, ModuleGraph, ModuleId, ModuleOrigin};
use crate::parser::parse_java;

use super::binding::{
    Completion, ElementType, FieldBinding, HierarchyCycle, LookupResult, MethodBinding, NullSpec, Nullness, ParamBinding, SuperRef,
    TypeBinding, TypeId, TypeOrigin,
};
use super::listener::{BindingEvent, BindingKind, BindingListener};
use super::provider::{TypeProvider, TypeSource};
use super::scope::CompilationUnitScope;

/// A compilation unit known to the environment, compiled or external.
#[derive(Debug, Clone)]
pub struct UnitRecord {
    pub path: String,
    pub package: String,
    pub module: Option<ModuleId>,
    pub imports: Vec<ImportDecl>,
    /// Top-level types in declaration order.
    pub types: Vec<TypeId>,
    pub external: bool,
}

struct ProviderEntry {
    provider: Box<dyn TypeProvider>,
    module: Option<ModuleId>,
    packages: BTreeSet<String>,
}

/// Modules owning a package, as seen from one requester.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageOwners {
    /// `None` stands for the unnamed module.
    pub visible: Vec<Option<ModuleId>>,
    /// Readable modules holding the package without exporting it to the requester.
    pub hidden: Vec<ModuleId>,
}

/// The single abstract method of a functional interface, with the target's
/// type arguments substituted.
#[derive(Debug, Clone)]
pub struct FunctionalMethod {
    pub interface: TypeId,
    pub method: MethodBinding,
}

impl FunctionalMethod {
    /// `Function<String,Object>.apply(String)` for the written target type.
    pub fn descriptor(&self, target: &TypeRef) -> String {
        let params: Vec<String> = self.method.params.iter().map(|p| p.type_ref.display()).collect();
        format!("{}.{}({})", target.display(), self.method.name, params.join(", "))
    }
}

pub struct LookupEnvironment {
    config: Config,
    types: Vec<TypeBinding>,
    units: Vec<UnitRecord>,
    providers: Vec<ProviderEntry>,
    modules: ModuleGraph,
    declared: HashMap<(String, Option<ModuleId>), TypeId>,
    loaded_uris: HashSet<String>,
    /// External units that failed to parse, with the parser's message.
    unparsable: Vec<(String, String)>,
    source_packages: HashMap<Option<ModuleId>, BTreeSet<String>>,
    package_defaults: HashMap<String, bool>,
    package_info_checked: HashSet<String>,
    memo: HashMap<(String, Option<ModuleId>), LookupResult>,
    listener: Option<Box<dyn BindingListener>>,
    notified: HashSet<(BindingKind, String)>,
}

impl LookupEnvironment {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            types: Vec::new(),
            units: Vec::new(),
            providers: Vec::new(),
            modules: ModuleGraph::new(),
            declared: HashMap::new(),
            loaded_uris: HashSet::new(),
            unparsable: Vec::new(),
            source_packages: HashMap::new(),
            package_defaults: HashMap::new(),
            package_info_checked: HashSet::new(),
            memo: HashMap::new(),
            listener: None,
            notified: HashSet::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_listener(&mut self, listener: Box<dyn BindingListener>) {
        self.listener = Some(listener);
    }

    pub fn modules(&self) -> &ModuleGraph {
        &self.modules
    }

    pub fn unit(&self, index: usize) -> &UnitRecord {
        &self.units[index]
    }

    pub fn type_binding(&self, id: TypeId) -> &TypeBinding {
        &self.types[id.0]
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeBinding> {
        self.types.iter()
    }

    /// Register a type provider; a provider with a module descriptor becomes
    /// a named module unless that name is already taken.
    pub fn add_provider(&mut self, provider: Box<dyn TypeProvider>) -> usize {
        let index = self.providers.len();
        let packages: BTreeSet<String> = provider.packages().into_iter().collect();
        let mut module = None;
        if let Some(TypeSource { uri, source }) = provider.module_source() {
            match parse_java(&source) {
                Ok(unit) => match unit.module_decl.as_ref() {
                    Some(decl) => {
                        let descriptor = ModuleDescriptor::from_decl(decl);
                        module = self.modules.add_provider(descriptor, index, &uri);
                    }
                    None => log::warn!("{} has no module declaration", uri),
                },
                Err(err) => log::warn!("ignoring unreadable module descriptor {}: {}", uri, err),
            }
        }
        if let Some(id) = module {
            for package in &packages {
                self.modules.add_package(id, package);
            }
        }
        log::debug!(
            "provider {} added as {}",
            provider.name(),
            module.map(|m| self.modules.name(m).to_string()).unwrap_or_else(|| "classpath".to_string())
        );
        self.providers.push(ProviderEntry { provider, module, packages });
        index
    }

    pub fn add_source_module(&mut self, decl: &ModuleDecl, root: &str, unit: usize) -> Result<ModuleId> {
        self.modules.add_source(ModuleDescriptor::from_decl(decl), root, unit)
    }

    /// Register a compiled unit and declare its types. Returns the unit index.
    pub fn add_source_unit(&mut self, path: &str, unit: &CompilationUnit, module: Option<ModuleId>) -> usize {
        let package = unit.package_name().to_string();
        if unit.module_decl.is_none() {
            if let Some(id) = module {
                self.modules.add_package(id, &package);
            }
            self.source_packages.entry(module).or_default().insert(package.clone());
        }
        if let Some(decl) = &unit.package_decl {
            if let Some(value) = self.nonnull_default_of(&decl.annotations) {
                self.package_defaults.insert(package.clone(), value);
            }
        }
        self.register_unit(path.to_string(), unit, module, false)
    }

    pub fn build_modules(&mut self) -> Result<()> {
        self.modules.build()
    }

    /// Report an external module answered to the listener.
    pub fn note_module_used(&mut self, id: ModuleId) {
        if let ModuleOrigin::Provider { uri, .. } = &self.modules.node(id).origin {
            let uri = uri.clone();
            let name = self.modules.name(id).to_string();
            self.notify(BindingKind::Module, &name, &uri);
        }
    }

    fn notify(&mut self, kind: BindingKind, name: &str, origin: &str) {
        if !self.notified.insert((kind, name.to_string())) {
            return;
        }
        if let Some(listener) = &self.listener {
            listener.binding_answered(&BindingEvent { kind, name, origin });
        }
    }

    fn register_unit(&mut self, path: String, unit: &CompilationUnit, module: Option<ModuleId>, external: bool) -> usize {
        let index = self.units.len();
        let package = unit.package_name().to_string();
        self.units.push(UnitRecord {
            path: path.clone(),
            package: package.clone(),
            module,
            imports: unit.imports.clone(),
            types: Vec::new(),
            external,
        });
        let origin = if external { TypeOrigin::External { uri: path } } else { TypeOrigin::Source { unit: index } };
        let mut types = Vec::new();
        for decl in &unit.type_decls {
            types.push(self.declare_type(decl, &package, None, module, &origin, index));
        }
        self.units[index].types = types;
        index
    }

    fn declare_type(
        &mut self,
        decl: &TypeDecl,
        package: &str,
        enclosing: Option<TypeId>,
        module: Option<ModuleId>,
        origin: &TypeOrigin,
        unit: usize,
    ) -> TypeId {
        let qualified_name = match enclosing {
            Some(outer) => format!("{}.{}", self.types[outer.0].qualified_name, decl.name),
            None if package.is_empty() => decl.name.clone(),
            None => format!("{}.{}", package, decl.name),
        };
        let id = TypeId(self.types.len());
        let interface = decl.is_interface();
        let methods = decl.methods().map(|m| self.method_binding(m, id, interface)).collect();
        let mut fields: Vec<FieldBinding> = decl.fields().flat_map(|f| self.field_bindings(f, id, interface)).collect();
        for constant in &decl.enum_constants {
            fields.push(FieldBinding {
                name: constant.name.clone(),
                declaring: id,
                type_ref: TypeRef::simple(&decl.name, constant.name_span),
                null: NullSpec { nullness: Nullness::NonNull, explicit: false, annotation_span: None },
                is_static: true,
                is_final: true,
                has_initializer: true,
                constant: None,
            });
        }
        let mut declared_supertypes = decl.extends.clone();
        declared_supertypes.extend(decl.implements.iter().cloned());

        self.types.push(TypeBinding {
            id,
            qualified_name: qualified_name.clone(),
            simple_name: decl.name.clone(),
            package: package.to_string(),
            kind: decl.kind,
            module,
            origin: origin.clone(),
            unit,
            type_params: decl.type_params.iter().map(|p| p.name.clone()).collect(),
            enclosing,
            member_types: Vec::new(),
            methods,
            fields,
            nonnull_by_default: self.nonnull_default_of(&decl.modifiers.annotations),
            annotation_targets: annotation_targets(decl),
            declared_supertypes,
            supertypes: Vec::new(),
            cycles: Vec::new(),
            completion: Completion::Pending,
        });
        for member in decl.member_types() {
            let member_id = self.declare_type(member, package, Some(id), module, origin, unit);
            self.types[id.0].member_types.push(member_id);
        }
        let key = (qualified_name, module);
        if self.declared.contains_key(&key) {
            log::warn!("type {} is declared more than once", key.0);
        } else {
            self.declared.insert(key, id);
        }
        id
    }

    /// `Some(true)` for `@NonNullByDefault`, `Some(false)` when cancelled.
    fn nonnull_default_of(&self, annotations: &[Annotation]) -> Option<bool> {
        annotations
            .iter()
            .find(|a| self.config.is_nonnull_by_default_annotation(&a.name))
            .map(|a| !a.arguments.as_deref().map(|args| args.contains("false")).unwrap_or(false))
    }

    fn null_spec<'a>(&self, annotations: impl IntoIterator<Item = &'a Annotation>, type_ref: &'a TypeRef) -> NullSpec {
        if type_ref.is_primitive() {
            return NullSpec::unknown();
        }
        let written = annotations.into_iter().chain(type_ref.annotations.iter());
        match Nullness::from_annotations(written, &self.config) {
            Some((nullness, span)) => NullSpec { nullness, explicit: true, annotation_span: Some(span) },
            None => NullSpec::unknown(),
        }
    }

    fn method_binding(&self, method: &MethodDecl, declaring: TypeId, interface: bool) -> MethodBinding {
        let modifiers = &method.modifiers;
        let is_default = modifiers.has(Modifier::Default);
        let is_static = modifiers.is_static();
        let is_abstract = modifiers.is_abstract()
            || (interface && method.body.is_none() && !is_static && !is_default && !modifiers.has(Modifier::Private));
        let params = method
            .parameters
            .iter()
            .map(|p| ParamBinding {
                name: p.name.clone(),
                type_ref: p.type_ref.clone(),
                null: self.null_spec(&p.modifiers.annotations, &p.type_ref),
                varargs: p.varargs,
            })
            .collect();
        let return_null = match &method.return_type {
            Some(ty) => self.null_spec(&modifiers.annotations, ty),
            None => NullSpec::unknown(),
        };
        MethodBinding {
            name: method.name.clone(),
            declaring,
            type_params: method.type_params.iter().map(|p| p.name.clone()).collect(),
            params,
            return_type: method.return_type.clone(),
            return_null,
            is_static,
            is_abstract,
            is_default,
        }
    }

    fn field_bindings(&self, field: &FieldDecl, declaring: TypeId, interface: bool) -> Vec<FieldBinding> {
        let is_final = interface || field.modifiers.is_final();
        field
            .declarators
            .iter()
            .map(|d| {
                let mut type_ref = field.type_ref.clone();
                type_ref.dims += d.extra_dims;
                let constant = if is_final { d.initializer.as_ref().and_then(boolean_constant) } else { None };
                FieldBinding {
                    name: d.name.clone(),
                    declaring,
                    null: self.null_spec(&field.modifiers.annotations, &type_ref),
                    type_ref,
                    is_static: interface || field.modifiers.is_static(),
                    is_final,
                    has_initializer: d.initializer.is_some(),
                    constant,
                }
            })
            .collect()
    }

    /// Resolve supertypes and apply nullness defaults, once.
    pub fn complete(&mut self, id: TypeId) {
        if self.types[id.0].completion != Completion::Pending {
            return;
        }
        self.types[id.0].completion = Completion::InProgress;

        let declared = self.types[id.0].declared_supertypes.clone();
        let type_vars = self.type_variables_in_scope(id);
        let resolved = self.declared_supertype_ids(id);
        let mut supertypes = Vec::new();
        let mut cycles = Vec::new();
        for (index, (written, super_id)) in declared.iter().zip(resolved).enumerate() {
            let Some(super_id) = super_id else { continue };
            let self_reference = super_id == id || self.encloses(id, super_id);
            if self_reference || self.leads_to(super_id, id) {
                log::debug!("dropping cyclic supertype {} of {}", written.name, self.types[id.0].qualified_name);
                cycles.push(HierarchyCycle { written: index, supertype: super_id, self_reference });
            } else {
                supertypes.push(SuperRef { id: super_id, type_args: written.type_args.clone() });
            }
        }
        let binding = &self.types[id.0];
        let needs_object = matches!(binding.kind, TypeKind::Class | TypeKind::Enum)
            && binding.qualified_name != OBJECT
            && !supertypes.iter().any(|s| !self.types[s.id.0].is_interface());
        if needs_object {
            let module = binding.module;
            if let LookupResult::Found(object) = self.find_top_level(JAVA_LANG, "Object", module) {
                if object != id {
                    supertypes.push(SuperRef { id: object, type_args: Vec::new() });
                }
            }
        }

        if self.effective_default(id) {
            let binding = &mut self.types[id.0];
            for method in &mut binding.methods {
                let mut vars = type_vars.clone();
                vars.extend(method.type_params.iter().cloned());
                for param in &mut method.params {
                    apply_default(&mut param.null, &param.type_ref, &vars);
                }
                if let Some(ret) = &method.return_type {
                    if !ret.is_void() {
                        apply_default(&mut method.return_null, ret, &vars);
                    }
                }
            }
        }

        let binding = &mut self.types[id.0];
        binding.supertypes = supertypes;
        binding.cycles = cycles;
        binding.completion = Completion::Done;
    }

    /// The written supertypes of `id`, resolved but not completed.
    fn declared_supertype_ids(&mut self, id: TypeId) -> Vec<Option<TypeId>> {
        let unit = self.types[id.0].unit;
        let declared = self.types[id.0].declared_supertypes.clone();
        let type_vars = self.type_variables_in_scope(id);
        let lookup_site = self.types[id.0].enclosing;
        let mut scope = CompilationUnitScope::new(self, unit);
        declared.iter().map(|written| scope.resolve_type_ref(self, written, lookup_site, &type_vars).found()).collect()
    }

    /// Whether the declared supertypes of `from` lead back to `target`.
    fn leads_to(&mut self, from: TypeId, target: TypeId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) || seen.len() > LOOKUP_MAX_HIERARCHY_DEPTH {
                continue;
            }
            stack.extend(self.declared_supertype_ids(current).into_iter().flatten());
        }
        false
    }

    /// Whether `inner` is nested, at any depth, inside `outer`.
    pub fn encloses(&self, outer: TypeId, inner: TypeId) -> bool {
        let mut current = self.types[inner.0].enclosing;
        while let Some(t) = current {
            if t == outer {
                return true;
            }
            current = self.types[t.0].enclosing;
        }
        false
    }

    /// Type parameters of the type and all its enclosing types.
    pub fn type_variables_in_scope(&self, id: TypeId) -> Vec<String> {
        let mut vars = Vec::new();
        let mut current = Some(id);
        while let Some(t) = current {
            vars.extend(self.types[t.0].type_params.iter().cloned());
            current = self.types[t.0].enclosing;
        }
        vars
    }

    /// Whether `@NonNullByDefault` is in effect inside type `id`.
    pub fn effective_default(&self, id: TypeId) -> bool {
        let mut current = Some(id);
        while let Some(t) = current {
            if let Some(value) = self.types[t.0].nonnull_by_default {
                return value;
            }
            current = self.types[t.0].enclosing;
        }
        self.package_default(&self.types[id.0].package)
    }

    pub fn package_default(&self, package: &str) -> bool {
        self.package_defaults.get(package).copied().unwrap_or(false)
    }

    /// Qualified lookup of a top-level type `package.simple`.
    pub fn find_top_level(&mut self, package: &str, simple: &str, requester: Option<ModuleId>) -> LookupResult {
        let qualified = if package.is_empty() { simple.to_string() } else { format!("{}.{}", package, simple) };
        let key = (qualified.clone(), requester);
        if let Some(result) = self.memo.get(&key) {
            return result.clone();
        }
        let result = self.find_top_level_uncached(package, &qualified, requester);
        if let LookupResult::Found(id) = result {
            self.answered(id);
        }
        self.memo.insert(key, result.clone());
        result
    }

    fn find_top_level_uncached(&mut self, package: &str, qualified: &str, requester: Option<ModuleId>) -> LookupResult {
        let owners: Vec<Option<ModuleId>> = match requester {
            None => std::iter::once(None).chain(self.modules.modules().map(|m| Some(m.id))).collect(),
            Some(reader) => self.modules.readable_from(reader).into_iter().map(Some).collect(),
        };
        let mut visible = Vec::new();
        let mut inaccessible = false;
        for owner in owners {
            let Some(id) = self.declared_or_load(qualified, owner) else { continue };
            let accessible = match owner {
                None => true,
                Some(module) => self.modules.is_visible(requester, module, package),
            };
            if accessible {
                visible.push(id);
            } else {
                inaccessible = true;
            }
        }
        match visible.len() {
            0 if inaccessible => LookupResult::NotAccessible(qualified.to_string()),
            0 => LookupResult::NotFound,
            1 => LookupResult::Found(visible[0]),
            _ => LookupResult::Ambiguous(visible),
        }
    }

    /// A type of `package` owned by exactly `module`, ignoring visibility.
    pub fn find_in_module(&mut self, package: &str, simple: &str, module: ModuleId) -> Option<TypeId> {
        let qualified = if package.is_empty() { simple.to_string() } else { format!("{}.{}", package, simple) };
        let found = self.declared_or_load(&qualified, Some(module));
        if let Some(id) = found {
            self.answered(id);
        }
        found
    }

    fn declared_or_load(&mut self, qualified: &str, module: Option<ModuleId>) -> Option<TypeId> {
        if let Some(id) = self.declared.get(&(qualified.to_string(), module)) {
            return Some(*id);
        }
        let package = qualified.rfind('.').map(|i| &qualified[..i]).unwrap_or("");
        for index in 0..self.providers.len() {
            let entry = &self.providers[index];
            if entry.module != module || !entry.packages.contains(package) {
                continue;
            }
            let Some(source) = entry.provider.find_type(qualified) else { continue };
            if self.loaded_uris.contains(&source.uri) {
                continue;
            }
            self.load_unit(index, source, module);
            if let Some(id) = self.declared.get(&(qualified.to_string(), module)) {
                return Some(*id);
            }
        }
        None
    }

    fn load_unit(&mut self, provider: usize, source: TypeSource, module: Option<ModuleId>) {
        self.loaded_uris.insert(source.uri.clone());
        let unit = match parse_java(&source.source) {
            Ok(unit) => unit,
            Err(err) => {
                log::warn!("unparsable external unit {}: {}", source.uri, err);
                self.unparsable.push((source.uri, err.to_string()));
                return;
            }
        };
        log::trace!("loaded external unit {}", source.uri);
        self.notify(BindingKind::CompilationUnit, &source.uri, &source.uri);
        let package = unit.package_name().to_string();
        if self.package_info_checked.insert(package.clone()) {
            if let Some(info) = self.providers[provider].provider.package_info(&package) {
                if let Ok(info_unit) = parse_java(&info.source) {
                    if let Some(decl) = &info_unit.package_decl {
                        if let Some(value) = self.nonnull_default_of(&decl.annotations) {
                            self.package_defaults.entry(package.clone()).or_insert(value);
                        }
                    }
                }
            }
        }
        self.register_unit(source.uri, &unit, module, true);
    }

    /// The first external unit that was needed but did not parse, as the
    /// fatal error it amounts to.
    pub fn unparsable_unit(&self) -> Option<Error> {
        let (uri, reason) = self.unparsable.first()?;
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        Some(Error::UnreadableClasspath { path: PathBuf::from(path), reason: reason.clone() })
    }

    fn answered(&mut self, id: TypeId) {
        let binding = &self.types[id.0];
        let TypeOrigin::External { uri } = &binding.origin else { return };
        let uri = uri.clone();
        let name = binding.qualified_name.clone();
        if let Some(module) = binding.module {
            self.note_module_used(module);
        }
        self.notify(BindingKind::Type, &name, &uri);
    }

    /// Resolve a fully qualified name, possibly naming a member type.
    pub fn resolve_qualified(&mut self, name: &str, requester: Option<ModuleId>) -> LookupResult {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() == 1 {
            return self.find_top_level("", name, requester);
        }
        for split in 1..parts.len() {
            let package = parts[..split].join(".");
            match self.find_top_level(&package, parts[split], requester) {
                LookupResult::Found(top) => {
                    let mut current = top;
                    for member in &parts[split + 1..] {
                        match self.member_type(current, member) {
                            Some(next) => current = next,
                            None => return LookupResult::NotFound,
                        }
                    }
                    return LookupResult::Found(current);
                }
                LookupResult::NotFound => continue,
                other => return other,
            }
        }
        LookupResult::NotFound
    }

    /// Declared or inherited member type `name` of `owner`.
    pub fn member_type(&mut self, owner: TypeId, name: &str) -> Option<TypeId> {
        let declared = self.types[owner.0]
            .member_types
            .iter()
            .copied()
            .find(|m| self.types[m.0].simple_name == name);
        if declared.is_some() {
            return declared;
        }
        if self.types[owner.0].completion == Completion::InProgress {
            return None;
        }
        for ancestor in self.hierarchy(owner).into_iter().skip(1) {
            let inherited = self.types[ancestor.0]
                .member_types
                .iter()
                .copied()
                .find(|m| self.types[m.0].simple_name == name);
            if inherited.is_some() {
                return inherited;
            }
        }
        None
    }

    /// `id` followed by all its supertypes, breadth first.
    pub fn hierarchy(&mut self, id: TypeId) -> Vec<TypeId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([(id, 0usize)]);
        while let Some((current, depth)) = queue.pop_front() {
            if !seen.insert(current) || depth > LOOKUP_MAX_HIERARCHY_DEPTH {
                continue;
            }
            self.complete(current);
            order.push(current);
            for sup in &self.types[current.0].supertypes {
                queue.push_back((sup.id, depth + 1));
            }
        }
        order
    }

    pub fn package_exists(&self, package: &str, requester: Option<ModuleId>) -> bool {
        let owners = self.package_owners(package, requester);
        !owners.visible.is_empty() || !owners.hidden.is_empty()
    }

    pub fn package_owners(&self, package: &str, requester: Option<ModuleId>) -> PackageOwners {
        let mut owners = PackageOwners::default();
        if requester.is_none() {
            let in_sources = self.source_packages.get(&None).map(|p| p.contains(package)).unwrap_or(false);
            let on_classpath = self.providers.iter().any(|p| p.module.is_none() && p.packages.contains(package));
            if in_sources || on_classpath {
                owners.visible.push(None);
            }
        }
        let candidates: Vec<ModuleId> = match requester {
            Some(reader) => self.modules.readable_from(reader),
            None => self.modules.modules().map(|m| m.id).collect(),
        };
        for module in candidates {
            if !self.modules.node(module).packages.contains(package) {
                continue;
            }
            if self.modules.is_visible(requester, module, package) {
                owners.visible.push(Some(module));
            } else {
                owners.hidden.push(module);
            }
        }
        owners
    }

    /// First method named `name` accepting `arity` arguments, searching
    /// the type and then its supertypes.
    pub fn find_method(&mut self, id: TypeId, name: &str, arity: usize) -> Option<MethodBinding> {
        let mut hierarchy = self.hierarchy(id);
        let module = self.types[id.0].module;
        if let LookupResult::Found(object) = self.find_top_level(JAVA_LANG, "Object", module) {
            if !hierarchy.contains(&object) {
                hierarchy.extend(self.hierarchy(object));
            }
        }
        hierarchy.into_iter().find_map(|t| {
            self.types[t.0]
                .methods_named(name)
                .find(|m| m.accepts_arity(arity))
                .cloned()
        })
    }

    pub fn find_field(&mut self, id: TypeId, name: &str) -> Option<FieldBinding> {
        self.hierarchy(id)
            .into_iter()
            .find_map(|t| self.types[t.0].field(name).cloned())
    }

    /// Methods of proper supertypes that `method` (declared in `id`) overrides.
    pub fn overridden_methods(&mut self, id: TypeId, method: &MethodBinding) -> Vec<MethodBinding> {
        if method.is_static || method.is_constructor() {
            return Vec::new();
        }
        let mut overridden = Vec::new();
        for ancestor in self.hierarchy(id).into_iter().skip(1) {
            for candidate in self.types[ancestor.0].methods_named(&method.name) {
                if candidate.is_static || candidate.params.len() != method.params.len() {
                    continue;
                }
                let compatible = method.params.iter().zip(&candidate.params).all(|(mine, theirs)| {
                    (mine.type_ref.simple_name() == theirs.type_ref.simple_name() && mine.type_ref.dims == theirs.type_ref.dims)
                        || self.is_type_variable(&mine.type_ref, method)
                        || self.is_type_variable(&theirs.type_ref, candidate)
                });
                if compatible {
                    overridden.push(candidate.clone());
                }
            }
        }
        overridden
    }

    /// Whether `type_ref` names a type variable visible in `method`.
    pub fn is_type_variable(&self, type_ref: &TypeRef, method: &MethodBinding) -> bool {
        if type_ref.name.contains('.') || !type_ref.type_args.is_empty() {
            return false;
        }
        method.type_params.iter().any(|v| *v == type_ref.name)
            || self.type_variables_in_scope(method.declaring).iter().any(|v| *v == type_ref.name)
    }

    /// `Outer.Inner` style name used in messages.
    pub fn display_name(&self, id: TypeId) -> String {
        let binding = &self.types[id.0];
        match binding.enclosing {
            Some(outer) => format!("{}.{}", self.display_name(outer), binding.simple_name),
            None => binding.simple_name.clone(),
        }
    }

    /// The single abstract method of interface `id` parameterized with `type_args`.
    pub fn functional_method(&mut self, id: TypeId, type_args: &[TypeRef]) -> Option<FunctionalMethod> {
        self.complete(id);
        if !self.types[id.0].is_interface() {
            return None;
        }
        let mut found: Vec<MethodBinding> = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back((id, self.substitution(id, type_args, &HashMap::new())));
        while let Some((current, substitution)) = queue.pop_front() {
            if !seen.insert(current) || seen.len() > LOOKUP_MAX_HIERARCHY_DEPTH {
                continue;
            }
            self.complete(current);
            let abstract_methods: Vec<MethodBinding> = self.types[current.0].abstract_methods().cloned().collect();
            for method in abstract_methods {
                if found.iter().any(|f| f.name == method.name && f.params.len() == method.params.len()) {
                    continue;
                }
                found.push(self.substitute(method, &substitution));
            }
            let supertypes = self.types[current.0].supertypes.clone();
            for sup in supertypes {
                if self.types[sup.id.0].is_interface() {
                    let next = self.substitution(sup.id, &sup.type_args, &substitution);
                    queue.push_back((sup.id, next));
                }
            }
        }
        if found.len() != 1 {
            return None;
        }
        found.pop().map(|method| FunctionalMethod { interface: id, method })
    }

    fn substitution(&self, id: TypeId, args: &[TypeRef], outer: &HashMap<String, TypeRef>) -> HashMap<String, TypeRef> {
        self.types[id.0]
            .type_params
            .iter()
            .zip(args)
            .map(|(param, arg)| (param.clone(), substitute_ref(arg, outer)))
            .collect()
    }

    fn substitute(&self, mut method: MethodBinding, substitution: &HashMap<String, TypeRef>) -> MethodBinding {
        for param in &mut method.params {
            if let Some(arg) = type_argument_for(&param.type_ref, substitution) {
                if !param.null.explicit {
                    param.null = self.null_spec(std::iter::empty(), &arg);
                }
                param.type_ref = with_dims(arg, param.type_ref.dims);
            }
        }
        if let Some(ret) = method.return_type.take() {
            match type_argument_for(&ret, substitution) {
                Some(arg) => {
                    if !method.return_null.explicit {
                        method.return_null = self.null_spec(std::iter::empty(), &arg);
                    }
                    method.return_type = Some(with_dims(arg, ret.dims));
                }
                None => method.return_type = Some(ret),
            }
        }
        method
    }
}

fn type_argument_for(type_ref: &TypeRef, substitution: &HashMap<String, TypeRef>) -> Option<TypeRef> {
    if type_ref.name.contains('.') || !type_ref.type_args.is_empty() {
        return None;
    }
    substitution.get(&type_ref.name).cloned()
}

fn substitute_ref(type_ref: &TypeRef, substitution: &HashMap<String, TypeRef>) -> TypeRef {
    match type_argument_for(type_ref, substitution) {
        Some(arg) => {
            let mut arg = with_dims(arg, type_ref.dims);
            if !type_ref.annotations.is_empty() {
                arg.annotations = type_ref.annotations.clone();
            }
            arg
        }
        None => {
            let mut copy = type_ref.clone();
            copy.type_args = type_ref.type_args.iter().map(|a| substitute_ref(a, substitution)).collect();
            copy
        }
    }
}

fn with_dims(mut type_ref: TypeRef, dims: usize) -> TypeRef {
    type_ref.dims += dims;
    type_ref
}

/// The `@Target` element kinds of an annotation type declaration.
fn annotation_targets(decl: &TypeDecl) -> Option<Vec<ElementType>> {
    if decl.kind != TypeKind::Annotation {
        return None;
    }
    let target = decl.modifiers.annotations.iter().find(|a| a.simple_name() == "Target")?;
    Some(ElementType::parse_targets(target.arguments.as_deref().unwrap_or("")))
}

fn apply_default(spec: &mut NullSpec, type_ref: &TypeRef, type_vars: &[String]) {
    if spec.explicit || type_ref.is_primitive() || type_ref.is_void() {
        return;
    }
    let is_type_var = type_ref.dims == 0 && type_ref.type_args.is_empty() && type_vars.iter().any(|v| *v == type_ref.name);
    if !is_type_var {
        spec.nullness = Nullness::NonNull;
    }
}

/// `true`, `false` or their negation.
fn boolean_constant(expr: &Expr) -> Option<bool> {
    match expr.unparenthesized() {
        Expr::Literal(literal) => match literal.value {
            Literal::Boolean(value) => Some(value),
            _ => None,
        },
        Expr::Unary(unary) if unary.op == UnaryOp::Not => boolean_constant(&unary.operand).map(|v| !v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::builtin;
    use crate::lookup::provider::InMemoryProvider;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn env_with(sources: &[(&str, &str)]) -> (LookupEnvironment, Vec<usize>) {
        let mut env = LookupEnvironment::new(Config::default());
        env.add_provider(Box::new(builtin::jdk()));
        let mut units = Vec::new();
        for (path, source) in sources {
            let unit = parse_java(source).expect("source parses");
            units.push(env.add_source_unit(path, &unit, None));
        }
        env.build_modules().expect("module graph");
        (env, units)
    }

    #[test]
    fn identity_is_stable_across_lookups() {
        let (mut env, _) = env_with(&[("p/A.java", "package p; public class A {}")]);
        let first = env.find_top_level("p", "A", None);
        let second = env.resolve_qualified("p.A", None);
        assert_eq!(first, second);
        let string_a = env.find_top_level("java.lang", "String", None);
        let string_b = env.resolve_qualified("java.lang.String", None);
        assert!(string_a.found().is_some());
        assert_eq!(string_a, string_b);
    }

    #[test]
    fn member_types_resolve_through_qualified_names() {
        let (mut env, _) = env_with(&[("p/A.java", "package p; public class A { public static class B { class C {} } }")]);
        let found = env.resolve_qualified("p.A.B.C", None).found().expect("member type");
        assert_eq!(env.type_binding(found).qualified_name, "p.A.B.C");
        assert_eq!(env.display_name(found), "A.B.C");
    }

    #[test]
    fn functional_method_substitutes_annotated_arguments() {
        let (mut env, _) = env_with(&[]);
        let function = env.resolve_qualified("java.util.function.Function", None).found().expect("Function");
        let unit = parse_java("class T { Function<@Nullable String, @NonNull Object> f; }").expect("parses");
        let field = unit.type_decls[0].fields().next().expect("field");
        let sam = env.functional_method(function, &field.type_ref.type_args).expect("single abstract method");
        assert_eq!(sam.method.name, "apply");
        assert_eq!(sam.method.params[0].null.nullness, Nullness::Nullable);
        assert_eq!(sam.method.return_null.nullness, Nullness::NonNull);
        assert_eq!(sam.descriptor(&field.type_ref), "Function<String,Object>.apply(String)");
    }

    #[test]
    fn inherited_functional_method_is_found() {
        let (mut env, _) = env_with(&[]);
        let unary = env.resolve_qualified("java.util.function.UnaryOperator", None).found().expect("UnaryOperator");
        let args = vec![TypeRef::simple("String", Default::default())];
        let sam = env.functional_method(unary, &args).expect("inherited apply");
        assert_eq!(sam.method.params[0].type_ref.name, "String");
    }

    #[test]
    fn cyclic_supertypes_are_dropped() {
        let (mut env, _) = env_with(&[("p/A.java", "package p; class A extends B {} class B extends A {}")]);
        let a = env.find_top_level("p", "A", None).found().expect("A");
        let b = env.find_top_level("p", "B", None).found().expect("B");
        let names: Vec<String> = env.hierarchy(a).into_iter().map(|t| env.type_binding(t).qualified_name.clone()).collect();
        assert_eq!(names, vec!["p.A".to_string(), "java.lang.Object".to_string()]);
        let cycles = env.type_binding(a).hierarchy_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].supertype, b);
        assert!(!cycles[0].self_reference);
    }

    #[test]
    fn defaults_make_parameters_nonnull() {
        let (mut env, _) = env_with(&[(
            "p/A.java",
            "package p; @NonNullByDefault public class A<T> { Object m(Object o, int i, T t) { return o; } }",
        )]);
        let a = env.find_top_level("p", "A", None).found().expect("A");
        env.complete(a);
        let method = &env.type_binding(a).methods[0];
        assert_eq!(method.params[0].null.nullness, Nullness::NonNull);
        assert!(!method.params[0].null.explicit);
        assert_eq!(method.params[1].null.nullness, Nullness::Unknown);
        assert_eq!(method.params[2].null.nullness, Nullness::Unknown);
        assert_eq!(method.return_null.nullness, Nullness::NonNull);
    }

    #[test]
    fn listener_hears_each_external_item_once() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut env = LookupEnvironment::new(Config::default());
        env.set_listener(Box::new(move |event: &BindingEvent<'_>| {
            sink.borrow_mut().push((event.kind, event.name.to_string()));
        }));
        env.add_provider(Box::new(InMemoryProvider::new("lib").with_file("q/Y.java", "package q; public class Y {}")));
        env.build_modules().expect("module graph");
        env.find_top_level("q", "Y", None);
        env.find_top_level("q", "Y", None);
        env.resolve_qualified("q.Y", None);
        let events = events.borrow();
        assert_eq!(
            *events,
            vec![
                (BindingKind::CompilationUnit, "memory:lib/q/Y.java".to_string()),
                (BindingKind::Type, "q.Y".to_string()),
            ]
        );
    }
}
