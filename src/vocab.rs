//! Well-known namespace IRIs and the fixed prefix tables.

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const FOAF_NS: &str = "http://xmlns.com/foaf/0.1/";
pub const DC_NS: &str = "http://purl.org/dc/elements/1.1/";
pub const DCTERMS_NS: &str = "http://purl.org/dc/terms/";
pub const SKOS_NS: &str = "http://www.w3.org/2004/02/skos/core#";
pub const EX_NS: &str = "http://example.org/";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";

pub const RDFS_CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
pub const RDFS_SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";

pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_EQUIVALENT_CLASS: &str = "http://www.w3.org/2002/07/owl#equivalentClass";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
pub const OWL_ANNOTATION_PROPERTY: &str = "http://www.w3.org/2002/07/owl#AnnotationProperty";

/// Prefixes bound on every graph before serialization.
pub const COMMON_NAMESPACES: &[(&str, &str)] = &[
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("owl", OWL_NS),
];

/// Prefixes declared on every SPARQL query that does not declare them itself.
pub const DEFAULT_QUERY_PREFIXES: &[(&str, &str)] = &[
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
    ("owl", OWL_NS),
    ("foaf", FOAF_NS),
    ("dc", DC_NS),
    ("dcterms", DCTERMS_NS),
    ("skos", SKOS_NS),
    ("ex", EX_NS),
];

/// Objects of `rdf:type` that mark a class definition.
pub const CLASS_KINDS: &[&str] = &[RDFS_CLASS, OWL_CLASS];

/// Objects of `rdf:type` that mark a property definition.
pub const PROPERTY_KINDS: &[&str] = &[
    RDF_PROPERTY,
    OWL_OBJECT_PROPERTY,
    OWL_DATATYPE_PROPERTY,
    OWL_ANNOTATION_PROPERTY,
];

/// Predicates that relate classes to each other.
pub const CLASS_RELATIONS: &[&str] = &[RDFS_SUB_CLASS_OF, OWL_EQUIVALENT_CLASS];

/// Predicates that describe properties.
pub const PROPERTY_RELATIONS: &[&str] = &[RDFS_DOMAIN, RDFS_RANGE, RDFS_SUB_PROPERTY_OF];
