use std::collections::BTreeMap;

use serde_json::{json, Value};
use specforge_core::{Field, TagConfig, Type, TypeStore};
use specforge_openapi::spec::{Info, Server};
use specforge_openapi::{
    GenError, Generator, OperationInfo, OperationResponse, ResponseHeader,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn generator(store: &TypeStore) -> Generator<'_> {
    Generator::new(store, TagConfig::default())
}

fn op_info(id: &str) -> OperationInfo {
    OperationInfo {
        id: id.to_string(),
        ..OperationInfo::default()
    }
}

fn pet(store: &mut TypeStore) -> Type {
    store.named_struct(
        "api",
        "Pet",
        vec![
            Field::new("Name", store.string())
                .tag("json", "name")
                .tag("validate", "required"),
            Field::new("Age", store.int()).tag("json", "age"),
        ],
    )
}

fn document(gen: &Generator<'_>) -> Value {
    serde_json::to_value(gen.api()).unwrap()
}

// ── Paths and parameters ────────────────────────────────────────────────────

#[test]
fn path_parameters_are_rewritten() {
    let mut store = TypeStore::new();
    let input = store.named_struct(
        "api",
        "GetPetInput",
        vec![Field::new("Name", store.string()).tag("path", "name")],
    );
    let out = pet(&mut store);
    let mut gen = generator(&store);

    gen.add_operation("/pets/:name", "GET", "", Some(input), Some(out), &op_info("GetPet"))
        .unwrap();
    let doc = document(&gen);
    let op = &doc["paths"]["/pets/{name}"]["get"];
    assert_eq!(op["operationId"], "GetPet");
    assert_eq!(
        op["parameters"][0],
        json!({
            "name": "name",
            "in": "path",
            "required": true,
            "schema": {"type": "string"}
        })
    );
}

#[test]
fn parameters_derive_from_located_fields() {
    let mut store = TypeStore::new();
    let page = store.named_struct(
        "api",
        "Page",
        vec![Field::new("Limit", store.int())
            .tag("query", "limit")
            .tag("default", "20")
            .tag("description", "Page size")],
    );
    let input = store.named_struct(
        "api",
        "ListPetsInput",
        vec![
            Field::new("Token", store.string())
                .tag("header", "X-Token")
                .tag("validate", "required"),
            Field::new("Owner", store.string()).tag("path", "owner"),
            Field::new("Page", page).flatten(),
        ],
    );
    let mut gen = generator(&store);
    gen.set_sort_params(true);

    let op = gen
        .add_operation("/owners/:owner/pets", "GET", "pets", Some(input), None, &op_info("ListPets"))
        .unwrap();
    // Sorted by location (path, query, header) then name.
    let names: Vec<_> = op.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["owner", "limit", "X-Token"]);
    assert!(op.parameters[0].required);
    assert!(!op.parameters[1].required);
    assert_eq!(op.parameters[1].description, "Page size");
    assert!(op.parameters[2].required);

    let doc = document(&gen);
    assert_eq!(
        doc["paths"]["/owners/{owner}/pets"]["get"]["parameters"][1]["schema"]["default"],
        json!(20)
    );
}

#[test]
fn located_fields_never_reach_the_body_schema() {
    let mut store = TypeStore::new();
    let input = store.named_struct(
        "api",
        "CreatePetInput",
        vec![
            Field::new("Name", store.string())
                .tag("json", "name")
                .tag("validate", "required"),
            Field::new("ApiKey", store.string()).tag("header", "X-Api-Key"),
        ],
    );
    let mut gen = generator(&store);

    gen.add_operation("/pets", "POST", "", Some(input), None, &op_info("CreatePet"))
        .unwrap();
    let doc = document(&gen);
    let body = &doc["paths"]["/pets"]["post"]["requestBody"];
    assert_eq!(body["required"], json!(true));
    assert_eq!(
        body["content"]["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/ApiCreatePetInput"})
    );
    let props = &doc["components"]["schemas"]["ApiCreatePetInput"]["properties"];
    assert!(props.get("name").is_some());
    assert!(props.get("X-Api-Key").is_none());
    assert!(props.get("ApiKey").is_none());
}

#[test]
fn get_operations_have_no_request_body() {
    let mut store = TypeStore::new();
    let input = store.named_struct(
        "api",
        "SearchInput",
        vec![Field::new("Q", store.string()).tag("query", "q")],
    );
    let mut gen = generator(&store);

    let op = gen
        .add_operation("/search", "GET", "", Some(input), None, &op_info("Search"))
        .unwrap();
    assert!(op.request_body.is_none());
}

#[test]
fn conflicting_parameter_locations_fail() {
    let mut store = TypeStore::new();
    let input = store.named_struct(
        "api",
        "BadInput",
        vec![Field::new("V", store.string()).tag("path", "v").tag("query", "v")],
    );
    let mut gen = generator(&store);

    assert!(matches!(
        gen.add_operation("/x/:v", "GET", "", Some(input), None, &op_info("Bad")),
        Err(GenError::ParameterLocation(_))
    ));
}

#[test]
fn path_parameters_must_have_a_placeholder() {
    let mut store = TypeStore::new();
    let input = store.named_struct(
        "api",
        "OrphanInput",
        vec![Field::new("Id", store.string()).tag("path", "id")],
    );
    let mut gen = generator(&store);

    assert!(matches!(
        gen.add_operation("/pets", "GET", "", Some(input), None, &op_info("Orphan")),
        Err(GenError::ParameterLocation(_))
    ));
}

#[test]
fn non_struct_inputs_are_rejected() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    assert!(matches!(
        gen.add_operation("/x", "GET", "", Some(store.string()), None, &op_info("X")),
        Err(GenError::UnsupportedType { .. })
    ));
}

// ── Operation identity ──────────────────────────────────────────────────────

#[test]
fn verbs_share_a_path_item() {
    let mut store = TypeStore::new();
    let out = pet(&mut store);
    let mut gen = generator(&store);

    gen.add_operation("/pets/:name", "GET", "", None, Some(out), &op_info("GetPet"))
        .unwrap();
    gen.add_operation("/pets/:name", "PUT", "", None, Some(out), &op_info("UpdatePet"))
        .unwrap();

    assert_eq!(gen.api().paths.len(), 1);
    let doc = document(&gen);
    let item = &doc["paths"]["/pets/{name}"];
    assert_eq!(item["get"]["operationId"], "GetPet");
    assert_eq!(item["put"]["operationId"], "UpdatePet");
}

#[test]
fn duplicate_operation_ids_fail() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    gen.add_operation("/a", "GET", "", None, None, &op_info("Op")).unwrap();
    assert!(matches!(
        gen.add_operation("/b", "GET", "", None, None, &op_info("Op")),
        Err(GenError::DuplicateOperation(_))
    ));
}

#[test]
fn empty_operation_ids_never_collide() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    gen.add_operation("/a", "GET", "", None, None, &op_info("")).unwrap();
    gen.add_operation("/b", "GET", "", None, None, &op_info("")).unwrap();
}

#[test]
fn unknown_methods_are_rejected() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    assert!(matches!(
        gen.add_operation("/a", "FETCH", "", None, None, &op_info("X")),
        Err(GenError::UnknownMethod(_))
    ));
}

// ── Responses ───────────────────────────────────────────────────────────────

#[test]
fn default_success_response() {
    let mut store = TypeStore::new();
    let out = pet(&mut store);
    let mut gen = generator(&store);

    gen.add_operation("/pets/:name", "GET", "", None, Some(out), &op_info("GetPet"))
        .unwrap();
    let doc = document(&gen);
    let resp = &doc["paths"]["/pets/{name}"]["get"]["responses"]["200"];
    assert_eq!(resp["description"], "OK");
    assert_eq!(
        resp["content"]["application/json"]["schema"],
        json!({"$ref": "#/components/schemas/ApiPet"})
    );
}

#[test]
fn explicit_status_and_no_content_on_204() {
    let mut store = TypeStore::new();
    let out = pet(&mut store);
    let mut gen = generator(&store);

    let mut info = op_info("CreatePet");
    info.status_code = 201;
    gen.add_operation("/pets", "POST", "", None, Some(out), &info).unwrap();

    let mut info = op_info("DeletePet");
    info.status_code = 204;
    gen.add_operation("/pets/:name", "DELETE", "", None, Some(out), &info).unwrap();

    let doc = document(&gen);
    assert_eq!(
        doc["paths"]["/pets"]["post"]["responses"]["201"]["description"],
        "Created"
    );
    let deleted = &doc["paths"]["/pets/{name}"]["delete"]["responses"]["204"];
    assert_eq!(deleted["description"], "No Content");
    assert!(deleted.get("content").is_none());
}

#[test]
fn wildcard_status_classes() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    let mut info = op_info("Probe");
    info.responses = vec![OperationResponse {
        code: "5XX".to_string(),
        description: "Backend failure".to_string(),
        ..OperationResponse::default()
    }];
    gen.add_operation("/probe", "GET", "", None, None, &info).unwrap();
    let doc = document(&gen);
    assert_eq!(
        doc["paths"]["/probe"]["get"]["responses"]["5XX"]["description"],
        "Backend failure"
    );
}

#[test]
fn malformed_status_codes_fail() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    for code in ["6XX", "0XX", "600", "99", "two-hundred"] {
        let mut info = op_info("");
        info.responses = vec![OperationResponse {
            code: code.to_string(),
            ..OperationResponse::default()
        }];
        assert!(
            matches!(
                gen.add_operation("/x", "GET", "", None, None, &info),
                Err(GenError::MalformedStatusCode(_))
            ),
            "code {code} should be rejected"
        );
    }
}

#[test]
fn response_content_is_additive_across_media_types() {
    let mut store = TypeStore::new();
    let out = pet(&mut store);
    let mut gen = generator(&store);

    let mut info = op_info("GetPet");
    info.responses = vec![
        OperationResponse {
            code: "400".to_string(),
            model: Some(out),
            ..OperationResponse::default()
        },
        OperationResponse {
            code: "400".to_string(),
            media_type: "application/xml".to_string(),
            model: Some(out),
            ..OperationResponse::default()
        },
    ];
    gen.add_operation("/pets/:name", "GET", "", None, Some(out), &info).unwrap();
    let doc = document(&gen);
    let content = &doc["paths"]["/pets/{name}"]["get"]["responses"]["400"]["content"];
    assert!(content.get("application/json").is_some());
    assert!(content.get("application/xml").is_some());
}

#[test]
fn duplicate_media_types_for_a_code_fail() {
    let mut store = TypeStore::new();
    let out = pet(&mut store);
    let mut gen = generator(&store);

    let mut info = op_info("GetPet");
    info.responses = vec![
        OperationResponse {
            code: "400".to_string(),
            model: Some(out),
            ..OperationResponse::default()
        },
        OperationResponse {
            code: "400".to_string(),
            model: Some(out),
            ..OperationResponse::default()
        },
    ];
    assert!(matches!(
        gen.add_operation("/pets/:name", "GET", "", None, Some(out), &info),
        Err(GenError::ResponseConflict(_))
    ));
}

#[test]
fn example_and_examples_are_mutually_exclusive() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    let mut info = op_info("X");
    info.responses = vec![OperationResponse {
        code: "400".to_string(),
        example: Some(json!({"error": "nope"})),
        examples: BTreeMap::from([("first".to_string(), json!({"error": "nope"}))]),
        ..OperationResponse::default()
    }];
    assert!(matches!(
        gen.add_operation("/x", "GET", "", None, None, &info),
        Err(GenError::ResponseConflict(_))
    ));
}

#[test]
fn response_examples_are_emitted() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    let mut info = op_info("X");
    info.responses = vec![OperationResponse {
        code: "429".to_string(),
        example: Some(json!({"retry_in": "30s"})),
        ..OperationResponse::default()
    }];
    gen.add_operation("/x", "GET", "", None, None, &info).unwrap();
    let doc = document(&gen);
    assert_eq!(
        doc["paths"]["/x"]["get"]["responses"]["429"]["content"]["application/json"]["example"],
        json!({"retry_in": "30s"})
    );
    // The default reason phrase fills the missing description.
    assert_eq!(
        doc["paths"]["/x"]["get"]["responses"]["429"]["description"],
        "Too Many Requests"
    );
}

#[test]
fn response_headers() {
    let mut store = TypeStore::new();
    let out = pet(&mut store);
    let mut gen = generator(&store);

    let mut info = op_info("GetPet");
    info.headers = vec![ResponseHeader {
        name: "X-Request-Id".to_string(),
        description: "Correlation identifier".to_string(),
        model: None,
    }];
    info.responses = vec![OperationResponse {
        code: "429".to_string(),
        headers: vec![ResponseHeader {
            name: "Retry-After".to_string(),
            description: String::new(),
            model: Some(store.int()),
        }],
        ..OperationResponse::default()
    }];
    gen.add_operation("/pets/:name", "GET", "", None, Some(out), &info).unwrap();
    let doc = document(&gen);
    let responses = &doc["paths"]["/pets/{name}"]["get"]["responses"];
    assert_eq!(
        responses["200"]["headers"]["X-Request-Id"],
        json!({
            "description": "Correlation identifier",
            "schema": {"type": "string"}
        })
    );
    assert_eq!(
        responses["429"]["headers"]["Retry-After"]["schema"],
        json!({"type": "integer", "format": "int32"})
    );
}

// ── Document metadata ───────────────────────────────────────────────────────

#[test]
fn info_and_servers() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    gen.set_info(Info {
        title: "Pet API".to_string(),
        version: "1.2.0".to_string(),
        description: "Everything about pets".to_string(),
        ..Info::default()
    });
    gen.set_servers(vec![Server {
        url: "https://api.example.org".to_string(),
        ..Server::default()
    }]);
    let doc = document(&gen);
    assert_eq!(doc["openapi"], "3.0.1");
    assert_eq!(doc["info"]["title"], "Pet API");
    assert_eq!(doc["info"]["version"], "1.2.0");
    assert_eq!(doc["servers"][0]["url"], "https://api.example.org");
}

#[test]
fn tags_stay_sorted_with_default_first() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    gen.add_tag("pets", "Pet operations");
    gen.add_tag("admin", "Administration");
    gen.add_tag("default", "Everything else");
    gen.add_tag("", "ignored");
    gen.add_tag("pets", "Pets");

    let names: Vec<_> = gen.api().tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["default", "admin", "pets"]);
    assert_eq!(gen.api().tags[2].description, "Pets");
}

#[test]
fn operations_carry_their_tag() {
    let store = TypeStore::new();
    let mut gen = generator(&store);

    let mut info = op_info("ListPets");
    info.summary = "List pets".to_string();
    info.deprecated = true;
    let op = gen
        .add_operation("/pets", "GET", "pets", None, None, &info)
        .unwrap();
    assert_eq!(op.tags, vec!["pets".to_string()]);
    assert!(op.deprecated);
    assert_eq!(op.summary, "List pets");
}
