//! Simple-name resolution for one compilation unit.
//!
//! Tiers, first hit wins:
//!
//! 1. type variables in scope
//! 2. the enclosing types and their (inherited) member types
//! 3. types declared in the unit
//! 4. single-type imports
//! 5. types of the same package
//! 6. on-demand imports
//! 7. module imports
//! 8. implicit `java.lang`
//!
//! Two or more distinct candidates inside tier 6 or 7 make the name
//! ambiguous. Results of tiers 3 to 8 are cached per unit.

use std::collections::HashMap;

use crate::ast::{ImportDecl, ImportKind, TypeRef};
use crate::consts::JAVA_LANG;
use crate::modules::ModuleId;

use super::binding::{LookupResult, TypeId};
use super::environment::LookupEnvironment;

pub struct CompilationUnitScope {
    unit: usize,
    package: String,
    module: Option<ModuleId>,
    imports: Vec<ImportDecl>,
    used: Vec<bool>,
    cache: HashMap<String, LookupResult>,
    module_packages: Option<Vec<(String, ModuleId)>>,
}

impl CompilationUnitScope {
    pub fn new(env: &LookupEnvironment, unit: usize) -> Self {
        let record = env.unit(unit);
        Self {
            unit,
            package: record.package.clone(),
            module: record.module,
            imports: record.imports.clone(),
            used: vec![false; record.imports.len()],
            cache: HashMap::new(),
            module_packages: None,
        }
    }

    pub fn unit(&self) -> usize {
        self.unit
    }

    pub fn module(&self) -> Option<ModuleId> {
        self.module
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn is_import_used(&self, index: usize) -> bool {
        self.used.get(index).copied().unwrap_or(false)
    }

    /// Count a bare identifier as a use of a matching single-type import.
    pub fn note_simple_name(&mut self, name: &str) {
        for (index, import) in self.imports.iter().enumerate() {
            if import.kind == ImportKind::Single && import.simple_name() == name {
                self.used[index] = true;
            }
        }
    }

    /// Resolve a written type reference, qualified or simple.
    pub fn resolve_type_ref(
        &mut self,
        env: &mut LookupEnvironment,
        type_ref: &TypeRef,
        enclosing: Option<TypeId>,
        type_vars: &[String],
    ) -> LookupResult {
        self.resolve_name(env, &type_ref.name, enclosing, type_vars)
    }

    pub fn resolve_name(
        &mut self,
        env: &mut LookupEnvironment,
        name: &str,
        enclosing: Option<TypeId>,
        type_vars: &[String],
    ) -> LookupResult {
        let Some((first, rest)) = name.split_once('.') else {
            return self.resolve(env, name, enclosing, type_vars);
        };
        match self.resolve(env, first, enclosing, type_vars) {
            LookupResult::Found(outer) => {
                let mut current = outer;
                for segment in rest.split('.') {
                    match env.member_type(current, segment) {
                        Some(member) => current = member,
                        None => return LookupResult::NotFound,
                    }
                }
                LookupResult::Found(current)
            }
            LookupResult::Ambiguous(candidates) => LookupResult::Ambiguous(candidates),
            _ => env.resolve_qualified(name, self.module),
        }
    }

    /// Resolve a simple name.
    pub fn resolve(
        &mut self,
        env: &mut LookupEnvironment,
        name: &str,
        enclosing: Option<TypeId>,
        type_vars: &[String],
    ) -> LookupResult {
        if type_vars.iter().any(|v| v == name) {
            return LookupResult::TypeVariable(name.to_string());
        }
        let mut current = enclosing;
        while let Some(id) = current {
            if env.type_binding(id).simple_name == name {
                return LookupResult::Found(id);
            }
            if let Some(member) = env.member_type(id, name) {
                return LookupResult::Found(member);
            }
            current = env.type_binding(id).enclosing;
        }

        if let Some(cached) = self.cache.get(name).cloned() {
            self.mark_single_import(name);
            return cached;
        }
        let result = self.resolve_in_unit(env, name);
        log::trace!("unit {} resolves {} to {:?}", self.unit, name, result);
        self.cache.insert(name.to_string(), result.clone());
        result
    }

    fn mark_single_import(&mut self, name: &str) {
        if let Some(index) = self
            .imports
            .iter()
            .position(|i| i.kind == ImportKind::Single && i.simple_name() == name)
        {
            self.used[index] = true;
        }
    }

    fn resolve_in_unit(&mut self, env: &mut LookupEnvironment, name: &str) -> LookupResult {
        let declared = env.unit(self.unit).types.iter().copied().find(|id| env.type_binding(*id).simple_name == name);
        if let Some(id) = declared {
            return LookupResult::Found(id);
        }

        let single = self
            .imports
            .iter()
            .position(|i| i.kind == ImportKind::Single && i.simple_name() == name);
        if let Some(index) = single {
            self.used[index] = true;
            let qualified = self.imports[index].name.clone();
            return env.resolve_qualified(&qualified, self.module);
        }

        let mut inaccessible = None;
        match env.find_top_level(&self.package, name, self.module) {
            LookupResult::NotFound => {}
            LookupResult::NotAccessible(q) => inaccessible = Some(q),
            found => return found,
        }

        let mut candidates: Vec<TypeId> = Vec::new();
        for index in 0..self.imports.len() {
            if self.imports[index].kind != ImportKind::OnDemand {
                continue;
            }
            let container = self.imports[index].name.clone();
            let result = if env.package_exists(&container, self.module) {
                env.find_top_level(&container, name, self.module)
            } else {
                match env.resolve_qualified(&container, self.module).found() {
                    Some(owner) => env.member_type(owner, name).map(LookupResult::Found).unwrap_or(LookupResult::NotFound),
                    None => LookupResult::NotFound,
                }
            };
            match result {
                LookupResult::Found(id) => {
                    self.used[index] = true;
                    if !candidates.contains(&id) {
                        candidates.push(id);
                    }
                }
                LookupResult::Ambiguous(ids) => {
                    self.used[index] = true;
                    for id in ids {
                        if !candidates.contains(&id) {
                            candidates.push(id);
                        }
                    }
                }
                LookupResult::NotAccessible(q) => inaccessible = Some(q),
                _ => {}
            }
        }
        if let Some(result) = Self::pick(candidates) {
            return result;
        }

        let mut candidates: Vec<TypeId> = Vec::new();
        for (package, module) in self.module_packages(env) {
            if let Some(id) = env.find_in_module(&package, name, module) {
                if !candidates.contains(&id) {
                    candidates.push(id);
                }
            }
        }
        if let Some(result) = Self::pick(candidates) {
            return result;
        }

        match env.find_top_level(JAVA_LANG, name, self.module) {
            LookupResult::NotFound => {}
            found => return found,
        }

        match inaccessible {
            Some(qualified) => LookupResult::NotAccessible(qualified),
            None => LookupResult::NotFound,
        }
    }

    fn pick(candidates: Vec<TypeId>) -> Option<LookupResult> {
        match candidates.len() {
            0 => None,
            1 => Some(LookupResult::Found(candidates[0])),
            _ => Some(LookupResult::Ambiguous(candidates)),
        }
    }

    /// Packages brought in by the unit's module imports, without duplicates.
    fn module_packages(&mut self, env: &LookupEnvironment) -> Vec<(String, ModuleId)> {
        if let Some(packages) = &self.module_packages {
            return packages.clone();
        }
        let mut packages: Vec<(String, ModuleId)> = Vec::new();
        for import in self.imports.iter().filter(|i| i.kind == ImportKind::Module) {
            let Some(imported) = env.modules().lookup(&import.name) else { continue };
            if !env.modules().reads(self.module, imported) {
                continue;
            }
            for entry in env.modules().module_import_packages(self.module, imported) {
                if !packages.contains(&entry) {
                    packages.push(entry);
                }
            }
        }
        self.module_packages = Some(packages.clone());
        packages
    }
}
