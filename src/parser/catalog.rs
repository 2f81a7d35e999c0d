//! Catalog of framework types referenced by C# sources but declared in
//! assemblies we never see.
//!
//! The binder materializes an entry (and its bases and interfaces) the first
//! time a source file refers to it, so hierarchy queries against framework
//! types work without reference assemblies.

use phf::phf_map;

use crate::analysis::TypeKind;

/// Shape of a framework type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkType {
    pub kind: TypeKind,
    pub base: Option<&'static str>,
    pub interfaces: &'static [&'static str],
}

const fn class(base: &'static str) -> FrameworkType {
    FrameworkType {
        kind: TypeKind::Class,
        base: Some(base),
        interfaces: &[],
    }
}

const fn attribute(interfaces: &'static [&'static str]) -> FrameworkType {
    FrameworkType {
        kind: TypeKind::Class,
        base: Some("System.Attribute"),
        interfaces,
    }
}

const INTERFACE: FrameworkType = FrameworkType {
    kind: TypeKind::Interface,
    base: None,
    interfaces: &[],
};

const HTTP_METHOD: &str = "Microsoft.AspNetCore.Mvc.Routing.HttpMethodAttribute";
const ROUTE_PROVIDER: &str = "Microsoft.AspNetCore.Mvc.Routing.IRouteTemplateProvider";
const METHOD_PROVIDER: &str = "Microsoft.AspNetCore.Mvc.Routing.IActionHttpMethodProvider";

static FRAMEWORK_TYPES: phf::Map<&'static str, FrameworkType> = phf_map! {
    "System.Object" => FrameworkType { kind: TypeKind::Class, base: None, interfaces: &[] },
    "System.Attribute" => class("System.Object"),
    "System.ObsoleteAttribute" => attribute(&[]),
    "System.SerializableAttribute" => attribute(&[]),
    "System.CodeDom.Compiler.GeneratedCodeAttribute" => attribute(&[]),
    "System.Runtime.CompilerServices.CompilerGeneratedAttribute" => attribute(&[]),

    "Microsoft.AspNetCore.Mvc.ControllerBase" => class("System.Object"),
    "Microsoft.AspNetCore.Mvc.Controller" => class("Microsoft.AspNetCore.Mvc.ControllerBase"),
    "Microsoft.AspNetCore.Mvc.ApiControllerAttribute" => attribute(&[]),
    "Microsoft.AspNetCore.Mvc.NonActionAttribute" => attribute(&[]),
    "Microsoft.AspNetCore.Mvc.RouteAttribute" => attribute(&[ROUTE_PROVIDER]),
    "Microsoft.AspNetCore.Mvc.AcceptVerbsAttribute" => attribute(&[METHOD_PROVIDER, ROUTE_PROVIDER]),

    "Microsoft.AspNetCore.Mvc.Routing.IRouteTemplateProvider" => INTERFACE,
    "Microsoft.AspNetCore.Mvc.Routing.IActionHttpMethodProvider" => INTERFACE,
    "Microsoft.AspNetCore.Mvc.Routing.HttpMethodAttribute" => attribute(&[METHOD_PROVIDER, ROUTE_PROVIDER]),

    "Microsoft.AspNetCore.Mvc.HttpGetAttribute" => class(HTTP_METHOD),
    "Microsoft.AspNetCore.Mvc.HttpPostAttribute" => class(HTTP_METHOD),
    "Microsoft.AspNetCore.Mvc.HttpPutAttribute" => class(HTTP_METHOD),
    "Microsoft.AspNetCore.Mvc.HttpDeleteAttribute" => class(HTTP_METHOD),
    "Microsoft.AspNetCore.Mvc.HttpPatchAttribute" => class(HTTP_METHOD),
    "Microsoft.AspNetCore.Mvc.HttpHeadAttribute" => class(HTTP_METHOD),
    "Microsoft.AspNetCore.Mvc.HttpOptionsAttribute" => class(HTTP_METHOD),
};

/// Look up a framework type by fully qualified name.
pub fn framework_type(name: &str) -> Option<&'static FrameworkType> {
    FRAMEWORK_TYPES.get(name)
}

/// Namespaces a C# file sees without any `using` directive.
pub const IMPLICIT_NAMESPACES: &[&str] = &["System"];
