//! Sample documents.
//!
//! The four `SAMPLE_*` documents describe the same API (get user by id, create user) in each
//! supported dialect and must convert to the same two tools.

pub const SAMPLE_OPENAPI_YAML: &str = r"
openapi: 3.0.0
info:
  title: Sample API
  version: 1.0.0
paths:
  /user/{id}:
    get:
      operationId: getUser
      summary: Get user by ID
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
        - name: verbose
          in: query
          schema:
            type: boolean
        - name: X-Custom-Header
          in: header
          schema:
            type: string
          description: A custom header for the request
      responses:
        '200':
          description: Successful response
          content:
            application/json:
              schema:
                type: object
                properties:
                  id:
                    type: string
                  username:
                    type: string
                  email:
                    type: string
  /user:
    post:
      summary: Create a new user
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                username:
                  type: string
                email:
                  type: string
              required: [username, email]
      responses:
        '201':
          description: User created successfully
";

pub const SAMPLE_OPENAPI_JSON: &str = r#"{
  "openapi": "3.0.0",
  "info": { "title": "Sample API", "version": "1.0.0" },
  "paths": {
    "/user/{id}": {
      "get": {
        "operationId": "getUser",
        "summary": "Get user by ID",
        "parameters": [
          { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } },
          { "name": "verbose", "in": "query", "schema": { "type": "boolean" } },
          {
            "name": "X-Custom-Header",
            "in": "header",
            "schema": { "type": "string" },
            "description": "A custom header for the request"
          }
        ],
        "responses": {
          "200": {
            "description": "Successful response",
            "content": {
              "application/json": {
                "schema": {
                  "type": "object",
                  "properties": {
                    "id": { "type": "string" },
                    "username": { "type": "string" },
                    "email": { "type": "string" }
                  }
                }
              }
            }
          }
        }
      }
    },
    "/user": {
      "post": {
        "summary": "Create a new user",
        "requestBody": {
          "content": {
            "application/json": {
              "schema": {
                "type": "object",
                "properties": {
                  "username": { "type": "string" },
                  "email": { "type": "string" }
                },
                "required": ["username", "email"]
              }
            }
          }
        },
        "responses": {
          "201": { "description": "User created successfully" }
        }
      }
    }
  }
}"#;

pub const SAMPLE_SWAGGER_YAML: &str = r"
swagger: '2.0'
info:
  title: Swagger Sample API
  version: 1.0.0
paths:
  /user/{id}:
    get:
      operationId: getUser
      summary: Get user by ID
      parameters:
        - name: id
          in: path
          required: true
          type: string
        - name: verbose
          in: query
          type: boolean
        - name: X-Custom-Header
          in: header
          type: string
          description: A custom header for the request
      responses:
        200:
          description: Successful response
          schema:
            type: object
            properties:
              id:
                type: string
              username:
                type: string
              email:
                type: string
  /user:
    post:
      summary: Create a new user
      parameters:
        - name: body
          in: body
          required: true
          schema:
            type: object
            properties:
              username:
                type: string
              email:
                type: string
            required: [username, email]
      responses:
        201:
          description: User created successfully
";

pub const SAMPLE_OPENAPI_31_YAML: &str = r"
openapi: 3.1.0
info:
  title: OpenAPI 3.1 Sample API
  version: 1.0.0
paths:
  /user/{id}:
    get:
      operationId: getUser
      summary: Get user by ID
      parameters:
        - name: id
          in: path
          required: true
          schema:
            type: string
        - name: verbose
          in: query
          schema:
            type: boolean
        - name: X-Custom-Header
          in: header
          schema:
            type: string
          description: A custom header for the request
      responses:
        '200':
          description: Successful response
          content:
            application/json:
              schema:
                type: object
                properties:
                  id:
                    type: string
                  username:
                    type: string
                  email:
                    type: string
  /user:
    post:
      summary: Create a new user
      requestBody:
        required: true
        content:
          application/json:
            schema:
              type: object
              properties:
                username:
                  type: string
                email:
                  type: string
              required: [username, email]
      responses:
        '201':
          description: User created successfully
";

/// Every sample, labelled by dialect.
pub const SAMPLES: [(&str, &str); 4] = [
    ("OpenAPI YAML", SAMPLE_OPENAPI_YAML),
    ("OpenAPI JSON", SAMPLE_OPENAPI_JSON),
    ("Swagger 2.0", SAMPLE_SWAGGER_YAML),
    ("OpenAPI 3.1", SAMPLE_OPENAPI_31_YAML),
];

/// Refs into `components`, with a `$ref`'d parameter, body and response.
pub const REFS_OPENAPI_YAML: &str = r"
openapi: 3.0.3
info:
  title: Pets
  version: '1'
paths:
  /pets/{petId}:
    put:
      operationId: updatePet
      parameters:
        - $ref: '#/components/parameters/PetId'
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Pet'
      responses:
        '200':
          description: Updated
          headers:
            X-Rate-Limit:
              description: Calls per hour allowed
              schema:
                type: integer
                format: int32
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
components:
  parameters:
    PetId:
      name: petId
      in: path
      required: true
      schema:
        type: integer
  schemas:
    Pet:
      type: object
      required: [name]
      properties:
        name:
          type: string
        tag:
          $ref: '#/components/schemas/Tag'
    Tag:
      type: string
";

/// A document whose only `$ref` points nowhere.
pub const DANGLING_REF_YAML: &str = r"
openapi: 3.0.0
info:
  title: Broken
  version: '1'
paths:
  /things:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Missing'
";
