mod deserializers;
